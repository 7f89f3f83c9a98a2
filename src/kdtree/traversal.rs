//! Utilities to traverse the KDTree structure.

use std::iter::FusedIterator;

use tinyvec::TinyVec;

use crate::kdtree::KDNode;

/// A pending visit of `node`, whose children are split on `axis`.
#[derive(Debug)]
pub(crate) struct Frame<'a, T> {
    pub(crate) node: Option<&'a T>,
    pub(crate) axis: usize,
}

impl<'a, T> Frame<'a, T> {
    #[inline]
    pub(crate) fn new(node: Option<&'a T>, axis: usize) -> Self {
        Self { node, axis }
    }
}

// Manual impls: deriving would require `T: Default + Clone`
impl<T> Default for Frame<'_, T> {
    fn default() -> Self {
        Self {
            node: None,
            axis: 0,
        }
    }
}

impl<T> Clone for Frame<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Frame<'_, T> {}

/// Pre-order iterator over the entities of a tree: node, then left subtree, then right
/// subtree.
///
/// Created by [`KDTreeIndex::pre_order`][crate::kdtree::KDTreeIndex::pre_order].
#[derive(Debug)]
pub struct PreOrder<'a, T> {
    stack: TinyVec<[Option<&'a T>; 33]>,
}

impl<'a, T: KDNode> PreOrder<'a, T> {
    pub(crate) fn new(root: Option<&'a T>) -> Self {
        let mut stack = TinyVec::new();
        if root.is_some() {
            stack.push(root);
        }
        Self { stack }
    }
}

impl<'a, T: KDNode> Iterator for PreOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.stack.pop() {
            let Some(node) = entry else {
                continue;
            };
            // Note: pushed in backwards order to what gets popped
            if node.right_child().is_some() {
                self.stack.push(node.right_child());
            }
            if node.left_child().is_some() {
                self.stack.push(node.left_child());
            }
            return Some(node);
        }
        None
    }
}

impl<T: KDNode> FusedIterator for PreOrder<'_, T> {}
