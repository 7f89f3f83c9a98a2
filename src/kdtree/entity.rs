use std::fmt;

use crate::r#type::KDNum;

/// A labeled point that can be arranged into a [`KDTree`][crate::kdtree::KDTree].
///
/// Implementors only store data: the tree decides which entity becomes the child of which,
/// and validates that every coordinate has the tree's dimensionality. Children are owned
/// outright by their parent, so a tree of `KDNode`s never contains shared or back references.
pub trait KDNode: Sized {
    /// The coordinate type.
    type Num: KDNum;

    /// The identifier used for name-based lookups. Labels need not be unique.
    fn label(&self) -> &str;

    /// The position of this entity.
    fn coordinate(&self) -> &[Self::Num];

    /// The child holding entities that sort before this one on its split axis.
    fn left_child(&self) -> Option<&Self>;

    /// The child holding entities that sort after this one on its split axis.
    fn right_child(&self) -> Option<&Self>;

    /// Replace the left child, returning the previous one.
    fn set_left_child(&mut self, child: Option<Box<Self>>) -> Option<Box<Self>>;

    /// Replace the right child, returning the previous one.
    fn set_right_child(&mut self, child: Option<Box<Self>>) -> Option<Box<Self>>;

    /// Detach both children, returning them as `(left, right)`.
    fn take_children(&mut self) -> (Option<Box<Self>>, Option<Box<Self>>) {
        (self.set_left_child(None), self.set_right_child(None))
    }
}

/// A named point in D-dimensional space.
///
/// ```
/// use kd_search::kdtree::{CoordinateEntity, KDNode};
///
/// let entity = CoordinateEntity::new("origin", vec![0.0, 0.0]);
/// assert_eq!(entity.label(), "origin");
/// assert_eq!(entity.to_string(), "origin (0, 0)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateEntity<N: KDNum> {
    label: String,
    coordinate: Vec<N>,
    left: Option<Box<Self>>,
    right: Option<Box<Self>>,
}

impl<N: KDNum> CoordinateEntity<N> {
    /// Create a new entity without children.
    pub fn new(label: impl Into<String>, coordinate: impl Into<Vec<N>>) -> Self {
        Self {
            label: label.into(),
            coordinate: coordinate.into(),
            left: None,
            right: None,
        }
    }

    /// The number of axes of this entity's coordinate.
    pub fn dimensions(&self) -> usize {
        self.coordinate.len()
    }
}

impl<N: KDNum> KDNode for CoordinateEntity<N> {
    type Num = N;

    fn label(&self) -> &str {
        &self.label
    }

    fn coordinate(&self) -> &[N] {
        &self.coordinate
    }

    fn left_child(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right_child(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    fn set_left_child(&mut self, child: Option<Box<Self>>) -> Option<Box<Self>> {
        std::mem::replace(&mut self.left, child)
    }

    fn set_right_child(&mut self, child: Option<Box<Self>>) -> Option<Box<Self>> {
        std::mem::replace(&mut self.right, child)
    }
}

/// Prints the label followed by the coordinate, e.g. `A (1, 2.5)`.
impl<N: KDNum> fmt::Display for CoordinateEntity<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.label)?;
        for (i, value) in self.coordinate.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}
