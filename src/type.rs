use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use num_traits::Float;

/// A trait for types that can be used as coordinates of a [`KDNode`][crate::kdtree::KDNode].
///
/// This trait is sealed and cannot be implemented for external types. Every ordering in the
/// tree goes through [`KDNum::total_cmp`], so the set of implementors is limited to the IEEE
/// float types whose total order is well defined.
pub trait KDNum: private::Sealed + Float + Debug + Display + Send + Sync + 'static {
    /// The total order of IEEE 754 floats: `-0.0 < 0.0`, and NaN sorts after every number.
    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl KDNum for f32 {
    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }
}

impl KDNum for f64 {
    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod tests {
    use super::KDNum;
    use std::cmp::Ordering;

    #[test]
    fn total_cmp_orders_signed_zero_and_nan() {
        assert_eq!(KDNum::total_cmp(&-0.0f64, &0.0), Ordering::Less);
        assert_eq!(KDNum::total_cmp(&f64::NAN, &f64::INFINITY), Ordering::Greater);
        assert_eq!(KDNum::total_cmp(&1.5f32, &1.5), Ordering::Equal);
    }
}
