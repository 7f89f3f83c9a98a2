use std::collections::HashMap;

use tinyvec::TinyVec;

use crate::error::{KDTreeError, Result};
use crate::kdtree::traversal::Frame;
use crate::kdtree::{KDNode, KDTreeBuilder, KDTreeIndex, Neighbour};
use crate::r#type::KDNum;

/// An owned, immutable k-d tree.
///
/// Every entity is owned by its parent and the root by the tree. The tree is built once,
/// either with [`KDTree::build`] or with a [`KDTreeBuilder`], and never changes afterwards.
#[derive(Debug, Clone)]
pub struct KDTree<T: KDNode> {
    pub(crate) last_dimension: usize,
    pub(crate) root: Option<Box<T>>,
    pub(crate) size: usize,
    pub(crate) depth: usize,
    /// Label to coordinate of the last entity added under that label.
    pub(crate) labels: HashMap<String, Vec<T::Num>>,
}

impl<T: KDNode> KDTree<T> {
    /// Create an empty tree for entities with `last_dimension + 1` axes.
    pub fn new(last_dimension: usize) -> Self {
        Self {
            last_dimension,
            root: None,
            size: 0,
            depth: 0,
            labels: HashMap::new(),
        }
    }

    /// Arrange `entities` into a tree where each entity has `last_dimension + 1` axes.
    ///
    /// This is [`KDTreeBuilder`] with its default options.
    pub fn build(entities: Vec<T>, last_dimension: usize) -> Result<Self> {
        let mut builder = KDTreeBuilder::with_capacity(last_dimension, entities.len());
        builder.extend(entities);
        builder.finish()
    }

    /// The number of entities in this tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if this tree holds no entities.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The number of levels of this tree; 0 when empty.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if some entity was added under `label`.
    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// The coordinate stored for `label`.
    pub fn coordinate_of(&self, label: &str) -> Option<&[T::Num]> {
        self.labels.get(label).map(Vec::as_slice)
    }

    /// Look up an entity by label.
    ///
    /// If several entities share a label, this is the last one in insertion order.
    pub fn entity(&self, label: &str) -> Option<&T> {
        let coordinate = self.coordinate_of(label)?;

        // Entities tied with a node on its split axis may sit in either subtree
        let mut stack: TinyVec<[Frame<'_, T>; 33]> = TinyVec::new();
        stack.push(Frame::new(self.root(), 0));

        while let Some(frame) = stack.pop() {
            let Some(node) = frame.node else {
                continue;
            };
            if node.label() == label && same_coordinate(node.coordinate(), coordinate) {
                return Some(node);
            }

            let axis = frame.axis;
            let child_axis = self.next_axis(axis);
            let ordering = coordinate[axis].total_cmp(&node.coordinate()[axis]);
            if ordering.is_ge() {
                stack.push(Frame::new(node.right_child(), child_axis));
            }
            if ordering.is_le() {
                stack.push(Frame::new(node.left_child(), child_axis));
            }
        }
        None
    }

    /// [`KDTreeIndex::k_nearest_neighbors`] around the entity stored under `label`.
    ///
    /// The entity itself is excluded, as are any others located at the same coordinate.
    pub fn k_nearest_neighbors_by_label(&self, label: &str, k: usize) -> Result<Vec<&T>> {
        self.k_nearest_neighbors(self.resolve(label)?, k)
    }

    /// [`KDTreeIndex::k_nearest_neighbors_with_distance`] around the entity stored under
    /// `label`.
    pub fn k_nearest_neighbors_with_distance_by_label(
        &self,
        label: &str,
        k: usize,
    ) -> Result<Vec<Neighbour<'_, T>>> {
        self.k_nearest_neighbors_with_distance(self.resolve(label)?, k)
    }

    /// [`KDTreeIndex::radius_search`] around the entity stored under `label`.
    ///
    /// The entity itself is part of the result.
    pub fn radius_search_by_label(&self, label: &str, radius: T::Num) -> Result<Vec<&T>> {
        self.radius_search(self.resolve(label)?, radius)
    }

    /// [`KDTreeIndex::radius_search_with_distance`] around the entity stored under `label`.
    pub fn radius_search_with_distance_by_label(
        &self,
        label: &str,
        radius: T::Num,
    ) -> Result<Vec<Neighbour<'_, T>>> {
        self.radius_search_with_distance(self.resolve(label)?, radius)
    }

    /// Consume the tree, returning its entities detached from each other, in pre-order.
    pub fn into_entities(self) -> Vec<T> {
        let mut entities = Vec::with_capacity(self.size);
        let mut stack: Vec<Box<T>> = self.root.into_iter().collect();
        while let Some(mut node) = stack.pop() {
            let (left, right) = node.take_children();
            stack.extend(right);
            stack.extend(left);
            entities.push(*node);
        }
        entities
    }

    fn resolve(&self, label: &str) -> Result<&[T::Num]> {
        self.coordinate_of(label)
            .ok_or_else(|| KDTreeError::UnknownLabel(label.to_string()))
    }
}

#[inline]
fn same_coordinate<N: KDNum>(a: &[N], b: &[N]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.total_cmp(y).is_eq())
}
