//! Tree nodes: an item, its splitting axis and owned children.

use kdinterp_core::SpatialItem;

#[derive(Debug, Clone)]
pub(super) struct Node<T> {
    pub(super) item: T,
    /// Splitting axis, fixed at creation: depth modulo the axis count.
    pub(super) dimension: usize,
    pub(super) left: Option<Box<Node<T>>>,
    pub(super) right: Option<Box<Node<T>>>,
}

impl<T: SpatialItem> Node<T> {
    pub(super) fn new(item: T, depth: usize) -> Self {
        Self {
            item,
            dimension: depth % T::axis_count(),
            left: None,
            right: None,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
