use std::collections::HashMap;

use tinyvec::TinyVec;
use tracing::debug;

use crate::error::{check_dimensions, check_not_nan, KDTreeError, Result};
use crate::kdtree::comparator::AxisComparator;
use crate::kdtree::{KDNode, KDTree};

/// How each sub-range is ordered around its median during construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Stable sort of every sub-range on its axis. O(n log² n).
    #[default]
    Sort,
    /// Partition every sub-range around its median with `select_nth_unstable_by`. O(n log n).
    ///
    /// Ties on the split axis may land on either side of the median, so the tree shape can
    /// differ from [`BuildStrategy::Sort`]. Query results only differ between the two when
    /// several entities are equidistant from the target.
    Select,
}

/// A builder to create a [`KDTree`].
///
/// ```
/// use kd_search::kdtree::{BuildStrategy, CoordinateEntity, KDTreeBuilder, KDTreeIndex};
///
/// let mut builder = KDTreeBuilder::new(1).strategy(BuildStrategy::Select);
/// builder.add(CoordinateEntity::new("a", vec![0.0, 0.0]));
/// builder.add(CoordinateEntity::new("b", vec![2.0, 0.0]));
/// builder.add(CoordinateEntity::new("c", vec![0.0, 2.0]));
/// let tree = builder.finish().unwrap();
///
/// assert_eq!(tree.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<T: KDNode> {
    entities: Vec<T>,
    last_dimension: usize,
    strategy: BuildStrategy,
}

impl<T: KDNode> KDTreeBuilder<T> {
    /// Create a new builder for entities with `last_dimension + 1` axes.
    pub fn new(last_dimension: usize) -> Self {
        Self::with_capacity(last_dimension, 0)
    }

    /// Create a new builder with room for `capacity` entities.
    pub fn with_capacity(last_dimension: usize, capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            last_dimension,
            strategy: BuildStrategy::default(),
        }
    }

    /// Set the construction strategy.
    pub fn strategy(mut self, strategy: BuildStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Add an entity to the tree, returning its insertion index.
    ///
    /// Any children already attached to the entity are discarded when the tree is built.
    pub fn add(&mut self, entity: T) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// The number of entities added so far.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities were added yet.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Consume this builder, arranging its entities into a [`KDTree`].
    ///
    /// Fails with [`KDTreeError::InvalidArgument`] if the tree would have fewer than two axes,
    /// with [`KDTreeError::DimensionMismatch`] for the first entity that does not have exactly
    /// `last_dimension + 1` axes, and with [`KDTreeError::InvalidArgument`] for the first entity
    /// holding a NaN.
    pub fn finish(self) -> Result<KDTree<T>> {
        if self.last_dimension < 1 {
            return Err(KDTreeError::InvalidArgument(format!(
                "Bulk construction needs a last dimension of at least 1, got {}.",
                self.last_dimension
            )));
        }
        let dimensions = self.last_dimension + 1;
        for entity in self.entities.iter() {
            check_dimensions(dimensions, entity.coordinate().len())?;
            check_not_nan(entity.coordinate())?;
        }

        let mut labels = HashMap::with_capacity(self.entities.len());
        for entity in self.entities.iter() {
            labels.insert(entity.label().to_string(), entity.coordinate().to_vec());
        }

        let mut entities = self.entities;
        let layout = arrange(&mut entities, self.last_dimension, self.strategy);
        let size = layout.order.len();
        let depth = layout.depth;
        let root = assemble(entities, layout);

        debug!(size, depth, strategy = ?self.strategy, "built kd-tree");

        Ok(KDTree {
            last_dimension: self.last_dimension,
            root,
            size,
            depth,
            labels,
        })
    }
}

impl<T: KDNode> Extend<T> for KDTreeBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.entities.extend(iter);
    }
}

/// The axis following `axis`, wrapping back to 0 after `last_dimension`.
#[inline]
pub(crate) fn next_axis(axis: usize, last_dimension: usize) -> usize {
    if axis >= last_dimension {
        0
    } else {
        axis + 1
    }
}

/// A half-open range of the entity buffer still to be split.
#[derive(Debug, Clone, Copy, Default)]
struct Span {
    start: usize,
    end: usize,
    axis: usize,
    depth: usize,
}

impl Span {
    /// Buffer position of this span's median, or `None` for an empty span.
    #[inline]
    fn median(&self) -> Option<usize> {
        (self.start < self.end).then(|| self.start + (self.end - self.start) / 2)
    }
}

/// The tree shape over positions of the arranged entity buffer.
#[derive(Debug)]
struct Layout {
    root: Option<usize>,
    /// `(left, right)` child positions of the node stored at each position.
    children: Vec<(Option<usize>, Option<usize>)>,
    /// Node positions in pre-order: every parent precedes its children.
    order: Vec<usize>,
    depth: usize,
}

/// kd-sort `entities` in place, recording which position becomes the child of which.
fn arrange<T: KDNode>(
    entities: &mut [T],
    last_dimension: usize,
    strategy: BuildStrategy,
) -> Layout {
    let n = entities.len();
    let root = Span {
        start: 0,
        end: n,
        axis: 0,
        depth: 1,
    };
    let mut layout = Layout {
        root: root.median(),
        children: vec![(None, None); n],
        order: Vec::with_capacity(n),
        depth: 0,
    };

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[Span; 33]> = TinyVec::new();
    if n > 0 {
        stack.push(root);
    }

    while let Some(span) = stack.pop() {
        let Some(m) = span.median() else {
            continue;
        };
        let comparator = AxisComparator::on(span.axis);
        let range = &mut entities[span.start..span.end];
        match strategy {
            BuildStrategy::Sort => range.sort_by(|a, b| comparator.order(a, b)),
            BuildStrategy::Select => {
                range.select_nth_unstable_by(m - span.start, |a, b| comparator.order(a, b));
            }
        }

        let axis = next_axis(span.axis, last_dimension);
        let left = Span {
            start: span.start,
            end: m,
            axis,
            depth: span.depth + 1,
        };
        let right = Span {
            start: m + 1,
            end: span.end,
            axis,
            depth: span.depth + 1,
        };

        layout.children[m] = (left.median(), right.median());
        layout.order.push(m);
        layout.depth = layout.depth.max(span.depth);

        // Note: pushed in backwards order to what gets popped
        if right.median().is_some() {
            stack.push(right);
        }
        if left.median().is_some() {
            stack.push(left);
        }
    }

    layout
}

/// Move every entity into its box, attaching children before their parents.
fn assemble<T: KDNode>(entities: Vec<T>, layout: Layout) -> Option<Box<T>> {
    let mut pending: Vec<Option<T>> = entities.into_iter().map(Some).collect();
    let mut built: Vec<Option<Box<T>>> = Vec::with_capacity(pending.len());
    built.resize_with(pending.len(), || None);

    for &pos in layout.order.iter().rev() {
        let Some(mut node) = pending[pos].take() else {
            continue;
        };
        let (left, right) = layout.children[pos];
        node.set_left_child(left.and_then(|i| built[i].take()));
        node.set_right_child(right.and_then(|i| built[i].take()));
        built[pos] = Some(Box::new(node));
    }

    layout.root.and_then(|pos| built[pos].take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdtree::{CoordinateEntity, KDTreeIndex};

    fn entity(label: &str, coordinate: &[f64]) -> CoordinateEntity<f64> {
        CoordinateEntity::new(label, coordinate.to_vec())
    }

    #[test]
    fn cycles_axes() {
        assert_eq!(next_axis(0, 2), 1);
        assert_eq!(next_axis(1, 2), 2);
        assert_eq!(next_axis(2, 2), 0);
    }

    #[test]
    fn rejects_a_single_axis() {
        let mut builder = KDTreeBuilder::new(0);
        builder.add(entity("a", &[1.0]));
        assert!(matches!(
            builder.finish(),
            Err(KDTreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_mismatched_entities() {
        let mut builder = KDTreeBuilder::new(1);
        builder.add(entity("a", &[1.0, 2.0]));
        builder.add(entity("b", &[1.0, 2.0, 3.0]));
        assert_eq!(
            builder.finish().unwrap_err(),
            KDTreeError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn rejects_nan_coordinates() {
        let mut builder = KDTreeBuilder::new(1);
        builder.extend([
            entity("A", &[0.0, 0.0]),
            entity("B", &[f64::NAN, 0.0]),
            entity("C", &[f64::NAN, 0.0]),
        ]);
        assert!(matches!(
            builder.finish(),
            Err(KDTreeError::InvalidArgument(_))
        ));

        let mut builder = KDTreeBuilder::new(1);
        builder.add(entity("A", &[0.0, f64::NAN]));
        assert!(matches!(
            builder.finish(),
            Err(KDTreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn infinite_coordinates_are_accepted() {
        let mut builder = KDTreeBuilder::new(1);
        builder.add(entity("far", &[f64::INFINITY, 0.0]));
        builder.add(entity("near", &[0.0, 0.0]));
        assert_eq!(builder.finish().unwrap().size(), 2);
    }

    #[test]
    fn empty_input_has_no_root() {
        let builder = KDTreeBuilder::<CoordinateEntity<f64>>::new(1);
        let tree = builder.finish().unwrap();
        assert_eq!(tree.size(), 0);
        assert!(tree.root().is_none());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn median_becomes_root() {
        let mut builder = KDTreeBuilder::new(1);
        builder.extend([
            entity("d", &[3.0, 0.0]),
            entity("a", &[0.0, 5.0]),
            entity("c", &[2.0, 1.0]),
            entity("b", &[1.0, 4.0]),
        ]);
        let tree = builder.finish().unwrap();

        // Sorted on x: a b c d, lower-median index 2
        let root = tree.root().unwrap();
        assert_eq!(root.label(), "c");

        // Left range [a, b] sorted on y: a(5) b(4) -> b a, median index 1 is a
        let left = root.left_child().unwrap();
        assert_eq!(left.label(), "a");
        assert_eq!(left.left_child().map(KDNode::label), Some("b"));
        assert!(left.right_child().is_none());

        let right = root.right_child().unwrap();
        assert_eq!(right.label(), "d");
        assert!(right.left_child().is_none() && right.right_child().is_none());

        assert_eq!(tree.size(), 4);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn discards_preexisting_children() {
        let mut stale = entity("stale", &[9.0, 9.0]);
        stale.set_left_child(Some(Box::new(entity("orphan", &[8.0, 8.0]))));

        let mut builder = KDTreeBuilder::new(1);
        builder.add(stale);
        let tree = builder.finish().unwrap();

        assert_eq!(tree.size(), 1);
        assert!(tree.root().unwrap().left_child().is_none());
    }
}
