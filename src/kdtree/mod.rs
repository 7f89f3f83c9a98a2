//! An implementation of an owned, immutable K-D Tree over labeled points.

#![warn(missing_docs)]

mod builder;
pub mod comparator;
mod entity;
mod index;
mod neighbour;
mod r#trait;
mod traversal;

pub use builder::{BuildStrategy, KDTreeBuilder};
pub use comparator::{AxisComparator, DistanceComparator};
pub use entity::{CoordinateEntity, KDNode};
pub use index::KDTree;
pub use neighbour::Neighbour;
pub use r#trait::KDTreeIndex;
pub use traversal::PreOrder;
