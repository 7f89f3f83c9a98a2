//! Orderings used to construct and query a [`KDTree`][crate::kdtree::KDTree].

use std::cmp::Ordering;

use crate::error::{check_dimensions, KDTreeError, Result};
use crate::kdtree::KDNode;
use crate::r#type::KDNum;

/// Orders entities by their value on a single axis.
///
/// ```
/// use std::cmp::Ordering;
/// use kd_search::kdtree::{AxisComparator, CoordinateEntity};
///
/// let a = CoordinateEntity::new("a", vec![1.0, 5.0]);
/// let b = CoordinateEntity::new("b", vec![2.0, 3.0]);
///
/// let mut comparator = AxisComparator::new(0).unwrap();
/// assert_eq!(comparator.compare(&a, &b), Ok(Ordering::Less));
/// comparator.set_axis(1).unwrap();
/// assert_eq!(comparator.compare(&a, &b), Ok(Ordering::Greater));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisComparator {
    axis: usize,
}

impl AxisComparator {
    /// Create a comparator over `axis`. Fails if `axis` is negative.
    pub fn new(axis: isize) -> Result<Self> {
        Ok(Self {
            axis: validate_axis(axis)?,
        })
    }

    /// A comparator over an axis that is known to be valid.
    pub(crate) fn on(axis: usize) -> Self {
        Self { axis }
    }

    /// The axis currently compared on.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Change the axis compared on. Fails if `axis` is negative, leaving the comparator as it
    /// was.
    pub fn set_axis(&mut self, axis: isize) -> Result<()> {
        self.axis = validate_axis(axis)?;
        Ok(())
    }

    /// Compare `a` and `b` on the configured axis.
    ///
    /// Fails with [`KDTreeError::DimensionMismatch`] if either coordinate has no value at the
    /// configured axis.
    pub fn compare<T: KDNode>(&self, a: &T, b: &T) -> Result<Ordering> {
        let (a, b) = (a.coordinate(), b.coordinate());
        match (a.get(self.axis), b.get(self.axis)) {
            (Some(x), Some(y)) => Ok(x.total_cmp(y)),
            _ => Err(KDTreeError::DimensionMismatch {
                expected: self.axis + 1,
                actual: a.len().min(b.len()),
            }),
        }
    }

    /// Compare `a` and `b` on the configured axis, which both must have.
    #[inline]
    pub(crate) fn order<T: KDNode>(&self, a: &T, b: &T) -> Ordering {
        a.coordinate()[self.axis].total_cmp(&b.coordinate()[self.axis])
    }
}

fn validate_axis(axis: isize) -> Result<usize> {
    usize::try_from(axis).map_err(|_| {
        KDTreeError::InvalidArgument(format!("Cannot compare on negative axis {}.", axis))
    })
}

/// Orders entities by descending Euclidean distance to a target, so that the head of a
/// max-heap is always the farthest candidate.
///
/// A comparator only borrows its target and is meant to live for a single query.
#[derive(Debug, Clone, Copy)]
pub struct DistanceComparator<'a, N: KDNum> {
    target: &'a [N],
}

impl<'a, N: KDNum> DistanceComparator<'a, N> {
    /// Create a comparator around `target`.
    pub fn new(target: &'a [N]) -> Self {
        Self { target }
    }

    /// The Euclidean distance between two coordinates.
    ///
    /// ```
    /// use kd_search::kdtree::DistanceComparator;
    ///
    /// let d = DistanceComparator::distance(&[0.0f64, 0.0], &[3.0, 4.0]).unwrap();
    /// assert_eq!(d, 5.0);
    /// assert!(DistanceComparator::distance(&[0.0f64], &[3.0, 4.0]).is_err());
    /// ```
    pub fn distance(a: &[N], b: &[N]) -> Result<N> {
        check_dimensions(a.len(), b.len())?;
        Ok(sq_dist(a, b).sqrt())
    }

    /// The distance from `entity` to the target.
    #[inline]
    pub fn distance_to_target<T: KDNode<Num = N>>(&self, entity: &T) -> Result<N> {
        Self::distance(entity.coordinate(), self.target)
    }

    /// Compare `a` and `b` by distance to the target, farthest first.
    pub fn compare<T: KDNode<Num = N>>(&self, a: &T, b: &T) -> Result<Ordering> {
        let da = self.distance_to_target(a)?;
        let db = self.distance_to_target(b)?;
        Ok(da.total_cmp(&db).reverse())
    }
}

/// Squared Euclidean distance over the common prefix of `a` and `b`.
#[inline]
pub(crate) fn sq_dist<N: KDNum>(a: &[N], b: &[N]) -> N {
    a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| {
        let d = x - y;
        acc + d * d
    })
}
