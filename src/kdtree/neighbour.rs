//! A result item returned by a query
use std::cmp::Ordering;

use crate::kdtree::KDNode;
use crate::r#type::KDNum;

/// An entry in the results of a nearest neighbour or radius query, with `distance` being the
/// Euclidean distance of `item` from the query point.
///
/// Neighbours order by distance alone, so a [`BinaryHeap`][std::collections::BinaryHeap] of
/// them keeps the farthest candidate at its head.
#[derive(Debug)]
pub struct Neighbour<'a, T: KDNode> {
    /// the distance of the found item from the query point
    pub distance: T::Num,
    /// the stored entity that was found as part of the query
    pub item: &'a T,
}

impl<T: KDNode> Clone for Neighbour<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: KDNode> Copy for Neighbour<'_, T> {}

impl<T: KDNode> Ord for Neighbour<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

impl<T: KDNode> PartialOrd for Neighbour<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: KDNode> Eq for Neighbour<'_, T> {}

impl<T: KDNode> PartialEq for Neighbour<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<'a, T: KDNode> From<Neighbour<'a, T>> for (T::Num, &'a T) {
    fn from(elem: Neighbour<'a, T>) -> Self {
        (elem.distance, elem.item)
    }
}
