use std::collections::BinaryHeap;
use std::fmt::Display;

use num_traits::{Float, Zero};
use tinyvec::TinyVec;
use tracing::trace;

use crate::error::{check_dimensions, check_not_nan, KDTreeError, Result};
use crate::kdtree::builder::next_axis;
use crate::kdtree::comparator::DistanceComparator;
use crate::kdtree::traversal::{Frame, PreOrder};
use crate::kdtree::{KDNode, KDTree, Neighbour};

/// A trait for searching and accessing data out of a KDTree.
///
/// Queries walk the tree with an explicit stack and keep all of their state local, so any
/// number of them may run against the same tree at once.
pub trait KDTreeIndex<T: KDNode>: Sized {
    /// The root entity, or `None` for an empty tree.
    fn root(&self) -> Option<&T>;

    /// The zero-based index of the final axis.
    fn last_dimension(&self) -> usize;

    /// The number of entities in this tree.
    fn size(&self) -> usize;

    /// The number of axes of every coordinate stored in this tree.
    fn dimensions(&self) -> usize {
        self.last_dimension() + 1
    }

    /// The split axis of the children of a node split on `axis`.
    fn next_axis(&self, axis: usize) -> usize {
        next_axis(axis, self.last_dimension())
    }

    /// Find up to `k` entities nearest to `target`, closest first.
    ///
    /// Entities located exactly at `target` are never returned. `k == 0` gives an empty
    /// result. Fails with [`KDTreeError::InvalidArgument`] if `target` holds a NaN.
    ///
    /// ```
    /// use kd_search::kdtree::{CoordinateEntity, KDTree, KDTreeIndex, KDNode};
    ///
    /// let tree = KDTree::build(
    ///     vec![
    ///         CoordinateEntity::new("A", vec![0.0, 0.0]),
    ///         CoordinateEntity::new("B", vec![2.0, 0.0]),
    ///         CoordinateEntity::new("D", vec![5.0, 5.0]),
    ///     ],
    ///     1,
    /// )
    /// .unwrap();
    ///
    /// let nearest = tree.k_nearest_neighbors(&[0.5, 0.5], 2).unwrap();
    /// let labels: Vec<_> = nearest.iter().map(|e| e.label()).collect();
    /// assert_eq!(labels, ["A", "B"]);
    /// ```
    fn k_nearest_neighbors(&self, target: &[T::Num], k: usize) -> Result<Vec<&T>> {
        Ok(self
            .k_nearest_neighbors_with_distance(target, k)?
            .into_iter()
            .map(|n| n.item)
            .collect())
    }

    /// Like [`k_nearest_neighbors`][Self::k_nearest_neighbors], also returning each distance.
    fn k_nearest_neighbors_with_distance(
        &self,
        target: &[T::Num],
        k: usize,
    ) -> Result<Vec<Neighbour<'_, T>>> {
        if k < 1 {
            return Ok(vec![]);
        }
        check_dimensions(self.dimensions(), target.len())?;
        check_not_nan(target)?;

        let comparator = DistanceComparator::new(target);
        // Max-heap on distance: the head is always the worst of the current candidates
        let mut queue: BinaryHeap<Neighbour<'_, T>> = BinaryHeap::with_capacity(k);

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Frame<'_, T>; 33]> = TinyVec::new();
        stack.push(Frame::new(self.root(), 0));

        let mut visited = 0usize;
        let mut pruned = 0usize;

        while let Some(frame) = stack.pop() {
            let Some(node) = frame.node else {
                continue;
            };
            visited += 1;

            let distance = comparator.distance_to_target(node)?;
            if !distance.is_zero() {
                if queue.len() < k {
                    queue.push(Neighbour {
                        distance,
                        item: node,
                    });
                } else if queue.peek().is_some_and(|worst| distance < worst.distance) {
                    queue.pop();
                    queue.push(Neighbour {
                        distance,
                        item: node,
                    });
                }
            }

            let axis = frame.axis;
            let child_axis = self.next_axis(axis);
            let axis_dist = target[axis] - node.coordinate()[axis];

            // Until the queue is full the whole space must be searched. Once it is, the far
            // side of this node's hyperplane is only searched if it could hold a closer point.
            let search_both = match queue.peek() {
                Some(worst) if queue.len() >= k => worst.distance > axis_dist.abs(),
                _ => true,
            };

            // Note: pushed in backwards order to what gets popped
            if search_both {
                stack.push(Frame::new(node.right_child(), child_axis));
                stack.push(Frame::new(node.left_child(), child_axis));
            } else if axis_dist >= T::Num::zero() {
                pruned += node.left_child().is_some() as usize;
                stack.push(Frame::new(node.right_child(), child_axis));
            } else {
                pruned += node.right_child().is_some() as usize;
                stack.push(Frame::new(node.left_child(), child_axis));
            }
        }

        trace!(k, visited, pruned, found = queue.len(), "k nearest neighbors");

        Ok(queue.into_sorted_vec())
    }

    /// Find every entity within `radius` of `target`, closest first.
    ///
    /// Unlike [`k_nearest_neighbors`][Self::k_nearest_neighbors], entities located exactly at
    /// `target` are included. Fails with [`KDTreeError::InvalidArgument`] for a negative or NaN
    /// radius, or a target holding a NaN.
    fn radius_search(&self, target: &[T::Num], radius: T::Num) -> Result<Vec<&T>> {
        Ok(self
            .radius_search_with_distance(target, radius)?
            .into_iter()
            .map(|n| n.item)
            .collect())
    }

    /// Like [`radius_search`][Self::radius_search], also returning each distance.
    fn radius_search_with_distance(
        &self,
        target: &[T::Num],
        radius: T::Num,
    ) -> Result<Vec<Neighbour<'_, T>>> {
        if radius.is_nan() || radius < T::Num::zero() {
            return Err(KDTreeError::InvalidArgument(format!(
                "Search radius must be a non-negative number, got {:?}.",
                radius
            )));
        }
        check_dimensions(self.dimensions(), target.len())?;
        check_not_nan(target)?;

        let comparator = DistanceComparator::new(target);
        let mut queue: BinaryHeap<Neighbour<'_, T>> = BinaryHeap::new();

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Frame<'_, T>; 33]> = TinyVec::new();
        stack.push(Frame::new(self.root(), 0));

        let mut visited = 0usize;

        while let Some(frame) = stack.pop() {
            let Some(node) = frame.node else {
                continue;
            };
            visited += 1;

            let distance = comparator.distance_to_target(node)?;
            if distance <= radius {
                queue.push(Neighbour {
                    distance,
                    item: node,
                });
            }

            // Every point across the hyperplane is at least |axis_dist| away from the target
            let axis = frame.axis;
            let child_axis = self.next_axis(axis);
            let axis_dist = target[axis] - node.coordinate()[axis];

            if -axis_dist <= radius {
                stack.push(Frame::new(node.right_child(), child_axis));
            }
            if axis_dist <= radius {
                stack.push(Frame::new(node.left_child(), child_axis));
            }
        }

        trace!(visited, found = queue.len(), "radius search");

        Ok(queue.into_sorted_vec())
    }

    /// Iterate over the entities of this tree in pre-order: node, left subtree, right subtree.
    fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder::new(self.root())
    }

    /// Invoke `f` on every entity in pre-order.
    fn for_each_pre_order<F: FnMut(&T)>(&self, f: F) {
        self.pre_order().for_each(f)
    }

    /// Describe every entity on its own line, in pre-order.
    fn print_tree(&self) -> Vec<String>
    where
        T: Display,
    {
        self.pre_order().map(|node| node.to_string()).collect()
    }
}

impl<T: KDNode> KDTreeIndex<T> for KDTree<T> {
    fn root(&self) -> Option<&T> {
        self.root.as_deref()
    }

    fn last_dimension(&self) -> usize {
        self.last_dimension
    }

    fn size(&self) -> usize {
        self.size
    }
}
