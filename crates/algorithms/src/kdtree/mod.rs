//! Dynamic k-d tree for spatial indexing
//!
//! A binary tree whose node at depth `d` partitions on axis
//! `d mod N`: items strictly less on that axis go left, everything
//! else (equal-on-axis included) goes right. Supports bulk build by
//! median splitting, insert, remove and bounded k-nearest-neighbor
//! queries in two traversal orders.
//!
//! Queries borrow the tree immutably and hold references into it for
//! their whole session, so the index cannot be mutated while a search
//! is in flight.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

mod node;
mod search;

use std::cmp::Ordering;

use tracing::{debug, warn};

use kdinterp_core::error::Result;
use kdinterp_core::SpatialItem;

use node::Node;

/// A k-d tree over items exposing the [`SpatialItem`] capabilities.
///
/// Cloning performs a deep copy; the clone shares no storage with the
/// source.
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    root: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<T: SpatialItem> KdTree<T> {
    /// Build a tree by recursive median splitting.
    ///
    /// At each depth the slice is stably sorted on the splitting axis
    /// and the lower median becomes the node, which keeps the shape
    /// deterministic for any input order of equal keys.
    pub fn build(items: Vec<T>) -> Self {
        let len = items.len();
        let root = Self::build_node(items, 0);
        debug!(items = len, "built k-d tree");

        Self { root, len }
    }

    fn build_node(mut items: Vec<T>, depth: usize) -> Option<Box<Node<T>>> {
        if items.is_empty() {
            return None;
        }

        if items.len() == 1 {
            return Some(Box::new(Node::new(items.remove(0), depth)));
        }

        let axis = depth % T::axis_count();
        items.sort_by(|a, b| a.cmp_on_axis(b, axis).unwrap_or(Ordering::Equal));

        let median = items.len() / 2;
        let item = items.remove(median);
        let right_items = items.split_off(median);

        let mut node = Node::new(item, depth);
        node.left = Self::build_node(items, depth + 1);
        node.right = Self::build_node(right_items, depth + 1);

        Some(Box::new(node))
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert an item, choosing its splitting axis from the depth it
    /// lands at. Returns false without modification when the item is
    /// tolerance-equal to one already present; with `update` the
    /// present item's value is overwritten first (coordinates keep
    /// their stored form).
    pub fn insert(&mut self, item: T, update: bool) -> bool {
        match Self::insert_node(&mut self.root, item, 0, update) {
            Ok(inserted) => {
                if inserted {
                    self.len += 1;
                }
                inserted
            }
            Err(error) => {
                warn!(%error, "insert failed");
                false
            }
        }
    }

    fn insert_node(
        slot: &mut Option<Box<Node<T>>>,
        item: T,
        depth: usize,
        update: bool,
    ) -> Result<bool> {
        let Some(node) = slot else {
            *slot = Some(Box::new(Node::new(item, depth)));
            return Ok(true);
        };

        #[cfg(not(feature = "allow-duplicate-points"))]
        if item.near_eq(&node.item) {
            if update {
                node.item.copy_value_from(&item);
            }
            return Ok(false);
        }

        if item.less_on_axis(&node.item, node.dimension)? {
            Self::insert_node(&mut node.left, item, depth + 1, update)
        } else {
            Self::insert_node(&mut node.right, item, depth + 1, update)
        }
    }

    /// Remove the item tolerance-equal to `item`. Returns false when
    /// the tree is empty or no such item is present.
    pub fn remove(&mut self, item: &T) -> bool {
        if self.root.is_none() {
            return false;
        }

        match Self::remove_node(&mut self.root, item) {
            Ok(removed) => {
                if removed {
                    self.len -= 1;
                }
                removed
            }
            Err(error) => {
                warn!(%error, "remove failed");
                false
            }
        }
    }

    fn remove_node(slot: &mut Option<Box<Node<T>>>, item: &T) -> Result<bool> {
        let Some(node) = slot else {
            return Ok(false);
        };

        if item.near_eq(&node.item) {
            if T::axis_count() == 1 {
                Self::detach_node_1d(slot);
            } else {
                Self::detach_node(slot)?;
            }
            return Ok(true);
        }

        if item.less_on_axis(&node.item, node.dimension)? {
            Self::remove_node(&mut node.left, item)
        } else {
            Self::remove_node(&mut node.right, item)
        }
    }

    /// Detach the node held by `slot`, restoring the partition
    /// invariant underneath it.
    fn detach_node(slot: &mut Option<Box<Node<T>>>) -> Result<()> {
        let Some(node) = slot else {
            return Ok(());
        };

        if node.is_leaf() {
            *slot = None;
            return Ok(());
        }

        // The left subtree was partitioned on this same axis, so it can
        // stand in as the right subtree: equal-on-axis items are
        // permitted on the right.
        if node.right.is_none() {
            node.right = node.left.take();
        }

        let min_item = match node.right.as_deref() {
            Some(right) => Self::min_on_axis(right, node.dimension, None)?.cloned(),
            None => None,
        };

        let Some(min_item) = min_item else {
            *slot = None;
            return Ok(());
        };

        node.item = min_item.clone();
        Self::remove_node(&mut node.right, &min_item)?;

        Ok(())
    }

    /// The item with the smallest coordinate on `axis` within a
    /// subtree. The right child can hold smaller values only under a
    /// node that does not split on `axis`.
    fn min_on_axis<'a>(
        node: &'a Node<T>,
        axis: usize,
        mut best: Option<&'a T>,
    ) -> Result<Option<&'a T>> {
        if let Some(left) = node.left.as_deref() {
            best = Self::min_on_axis(left, axis, best)?;
        }

        let better = match best {
            Some(current) => node.item.less_on_axis(current, axis)?,
            None => true,
        };
        if better {
            best = Some(&node.item);
        }

        if node.dimension != axis {
            if let Some(right) = node.right.as_deref() {
                best = Self::min_on_axis(right, axis, best)?;
            }
        }

        Ok(best)
    }

    /// Classic binary-search-tree deletion for the one-dimensional
    /// case: promote the lone child, or substitute the in-order
    /// successor taken from the right subtree.
    fn detach_node_1d(slot: &mut Option<Box<Node<T>>>) {
        let Some(mut node) = slot.take() else {
            return;
        };

        if node.is_leaf() {
            // stays detached
        } else if node.left.is_none() {
            *slot = node.right.take();
        } else if node.right.is_none() {
            *slot = node.left.take();
        } else {
            if let Some(successor) = Self::detach_min_1d(&mut node.right) {
                node.item = successor;
            }
            *slot = Some(node);
        }
    }

    /// Detach the leftmost item of a subtree, splicing its right child
    /// into its place.
    fn detach_min_1d(link: &mut Option<Box<Node<T>>>) -> Option<T> {
        let node = link.as_mut()?;

        if node.left.is_some() {
            return Self::detach_min_1d(&mut node.left);
        }

        let mut taken = link.take()?;
        *link = taken.right.take();

        Some(taken.item)
    }

    /// Items in in-order traversal order (sorted projection on the
    /// axes the nodes split on).
    pub fn items(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        Self::collect(&self.root, &mut out);
        out
    }

    fn collect(slot: &Option<Box<Node<T>>>, out: &mut Vec<T>) {
        if let Some(node) = slot {
            Self::collect(&node.left, out);
            out.push(node.item.clone());
            Self::collect(&node.right, out);
        }
    }
}

impl<T: SpatialItem> From<Vec<T>> for KdTree<T> {
    fn from(items: Vec<T>) -> Self {
        Self::build(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdinterp_core::Point;

    type TestPoint = Point<i32, f64, 2>;
    type LinePoint = Point<i32, f64, 1>;

    fn sample_points() -> Vec<TestPoint> {
        vec![
            Point::new([2, 3], 10.0),
            Point::new([5, 4], 20.0),
            Point::new([9, 6], 30.0),
            Point::new([4, 7], 40.0),
            Point::new([8, 1], 50.0),
            Point::new([7, 2], 60.0),
        ]
    }

    fn axis_projection(tree: &KdTree<TestPoint>, axis: usize) -> Vec<i32> {
        let mut coords: Vec<i32> = tree
            .items()
            .iter()
            .map(|p| p.coord(axis).unwrap())
            .collect();
        coords.sort_unstable();
        coords
    }

    #[test]
    fn test_build_and_len() {
        let tree = KdTree::build(sample_points());
        assert_eq!(tree.len(), 6);
        assert!(!tree.is_empty());
        assert_eq!(tree.items().len(), 6);
    }

    #[test]
    fn test_build_empty() {
        let tree: KdTree<TestPoint> = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.items().is_empty());
    }

    #[test]
    fn test_build_root_is_lower_median() {
        let tree = KdTree::build(sample_points());
        // sorted by x: 2 4 5 7 8 9 -> lower median is x = 7
        let root = tree.root.as_deref().expect("non-empty tree");
        assert_eq!(root.item.coord(0).unwrap(), 7);
        assert_eq!(root.dimension, 0);
    }

    #[test]
    fn test_partition_invariant_after_build() {
        fn check(node: &Node<TestPoint>) {
            if let Some(left) = node.left.as_deref() {
                assert!(left
                    .item
                    .less_on_axis(&node.item, node.dimension)
                    .unwrap());
                check(left);
            }
            if let Some(right) = node.right.as_deref() {
                assert!(!right
                    .item
                    .less_on_axis(&node.item, node.dimension)
                    .unwrap());
                check(right);
            }
        }

        let tree = KdTree::build(sample_points());
        check(tree.root.as_deref().expect("non-empty tree"));
    }

    #[test]
    fn test_insert_grows_tree() {
        let mut tree = KdTree::build(sample_points());
        assert!(tree.insert(Point::new([1, 1], 70.0), false));
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_insert_into_empty_tree() {
        let mut tree: KdTree<TestPoint> = KdTree::default();
        assert!(tree.insert(Point::new([1, 1], 70.0), false));
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }

    #[cfg(not(feature = "allow-duplicate-points"))]
    #[test]
    fn test_insert_rejects_duplicates() {
        let mut tree = KdTree::build(sample_points());
        assert!(!tree.insert(Point::new([5, 4], 99.0), false));
        assert_eq!(tree.len(), 6);
    }

    #[cfg(not(feature = "allow-duplicate-points"))]
    #[test]
    fn test_insert_update_overwrites_value() {
        let mut tree = KdTree::build(sample_points());
        assert!(!tree.insert(Point::new([5, 4], 99.0), true));
        assert_eq!(tree.len(), 6);

        let updated = tree
            .items()
            .into_iter()
            .find(|p| p.near_eq(&Point::new([5, 4], 0.0)))
            .expect("updated item is still present");
        assert_eq!(updated.value(), 99.0);
    }

    #[test]
    fn test_remove_leaf_and_missing() {
        let mut tree = KdTree::build(sample_points());
        assert!(tree.remove(&Point::new([2, 3], 0.0)));
        assert_eq!(tree.len(), 5);
        assert!(!tree.remove(&Point::new([2, 3], 0.0)));
        assert!(!tree.remove(&Point::new([99, 99], 0.0)));
    }

    #[test]
    fn test_remove_root_preserves_partitioning() {
        let mut tree = KdTree::build(sample_points());
        assert!(tree.remove(&Point::new([7, 2], 0.0)));
        assert_eq!(tree.len(), 5);

        fn check(node: &Node<TestPoint>) {
            if let Some(left) = node.left.as_deref() {
                assert!(left
                    .item
                    .less_on_axis(&node.item, node.dimension)
                    .unwrap());
                check(left);
            }
            if let Some(right) = node.right.as_deref() {
                assert!(!right
                    .item
                    .less_on_axis(&node.item, node.dimension)
                    .unwrap());
                check(right);
            }
        }
        check(tree.root.as_deref().expect("non-empty tree"));
        assert_eq!(axis_projection(&tree, 0), vec![2, 4, 5, 8, 9]);
    }

    #[test]
    fn test_remove_all_items() {
        let mut tree = KdTree::build(sample_points());
        for point in sample_points() {
            assert!(tree.remove(&point), "failed to remove {point}");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_remove_from_empty_tree() {
        let mut tree: KdTree<TestPoint> = KdTree::default();
        assert!(!tree.remove(&Point::new([1, 1], 0.0)));
    }

    #[test]
    fn test_insert_remove_round_trip() {
        let tree = KdTree::build(sample_points());
        let before: Vec<TestPoint> = tree.items();

        let mut mutated = tree.clone();
        let extra = Point::new([3, 9], 1.0);
        assert!(mutated.insert(extra, false));
        assert!(mutated.remove(&extra));

        let after = mutated.items();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!(a.exactly_eq(b));
        }
    }

    #[test]
    fn test_min_on_axis() {
        let tree = KdTree::build(sample_points());
        let root = tree.root.as_deref().expect("non-empty tree");

        let min_x = KdTree::min_on_axis(root, 0, None)
            .unwrap()
            .expect("non-empty subtree");
        assert_eq!(min_x.coord(0).unwrap(), 2);

        let min_y = KdTree::min_on_axis(root, 1, None)
            .unwrap()
            .expect("non-empty subtree");
        assert_eq!(min_y.coord(1).unwrap(), 1);
    }

    #[test]
    fn test_deep_copy_shares_nothing() {
        let tree = KdTree::build(sample_points());
        let mut copy = tree.clone();
        assert!(copy.remove(&Point::new([5, 4], 0.0)));
        assert_eq!(copy.len(), 5);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_one_dimensional_delete_promotes_successor() {
        let points: Vec<LinePoint> = [50, 30, 70, 20, 40, 60, 80]
            .iter()
            .map(|&x| Point::new([x], x as f64))
            .collect();

        let mut tree = KdTree::build(points);

        // root (both children present): substituted by its in-order successor
        let root_coord = tree.root.as_deref().expect("non-empty tree").item.coord(0).unwrap();
        assert!(tree.remove(&Point::new([root_coord], 0.0)));

        let coords: Vec<i32> = tree.items().iter().map(|p| p.coord(0).unwrap()).collect();
        let mut sorted = coords.clone();
        sorted.sort_unstable();
        assert_eq!(coords, sorted, "in-order traversal stays sorted");
        assert_eq!(tree.len(), 6);

        // lone-child promotion
        assert!(tree.remove(&Point::new([70], 0.0)));
        let coords: Vec<i32> = tree.items().iter().map(|p| p.coord(0).unwrap()).collect();
        let mut sorted = coords.clone();
        sorted.sort_unstable();
        assert_eq!(coords, sorted);
    }
}
