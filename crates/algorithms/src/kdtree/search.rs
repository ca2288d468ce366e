//! Bounded k-nearest-neighbor search
//!
//! Both traversal variants share one transient session: the borrowed
//! query, the neighbor cap and a max-heap holding at most `k`
//! candidates keyed by distance. The forward variant inspects a node
//! before its subtrees; the reverse variant floats up from the leaves,
//! visiting a node between its primary and auxiliary subtrees. The
//! auxiliary subtree is entered only while the heap is not full or the
//! splitting-plane distance can still beat the worst retained
//! candidate.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::warn;

use kdinterp_core::error::Result;
use kdinterp_core::numeric::Scalar;
#[cfg(not(feature = "zero-distance-handling"))]
use kdinterp_core::numeric::Tolerance;
use kdinterp_core::SpatialItem;

use super::node::Node;
use super::KdTree;

/// A candidate neighbor and its distance to the query.
struct Candidate<'t, T> {
    distance: f64,
    item: &'t T,
}

impl<T> PartialEq for Candidate<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl<T> Eq for Candidate<'_, T> {}

impl<T> PartialOrd for Candidate<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Candidate<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

/// Transient state of one query, dropped on every exit path.
struct Session<'q, 't, T> {
    query: &'q T,
    num_neighbors: usize,
    neighbors: BinaryHeap<Candidate<'t, T>>,
}

impl<'q, 't, T: SpatialItem> Session<'q, 't, T> {
    fn new(query: &'q T, num_neighbors: usize) -> Self {
        Self {
            query,
            num_neighbors,
            neighbors: BinaryHeap::with_capacity(num_neighbors + 1),
        }
    }

    /// Offer a node to the bounded heap: push while below the cap,
    /// afterwards replace the worst retained candidate when beaten.
    fn offer(&mut self, node: &'t Node<T>) {
        let distance = self.query.distance(&node.item);

        if self.neighbors.len() < self.num_neighbors {
            self.neighbors.push(Candidate {
                distance,
                item: &node.item,
            });
        } else if self
            .neighbors
            .peek()
            .is_some_and(|worst| distance < worst.distance)
        {
            self.neighbors.pop();
            self.neighbors.push(Candidate {
                distance,
                item: &node.item,
            });
        }
    }

    /// Whether the subtree on the far side of the splitting plane can
    /// still contribute a neighbor.
    fn aux_required(&self, node: &Node<T>) -> Result<bool> {
        if self.neighbors.len() < self.num_neighbors {
            return Ok(true);
        }

        let axial = self
            .query
            .axis_distance_f64(&node.item, node.dimension)?
            .abs();

        Ok(self
            .neighbors
            .peek()
            .is_some_and(|worst| axial < worst.distance))
    }

    fn forward(&mut self, node: &'t Node<T>) -> Result<()> {
        self.offer(node);

        let less = self.query.less_on_axis(&node.item, node.dimension)?;
        let (primary, aux) = if less {
            (node.left.as_deref(), node.right.as_deref())
        } else {
            (node.right.as_deref(), node.left.as_deref())
        };

        if let Some(primary) = primary {
            self.forward(primary)?;
        }

        if let Some(aux) = aux {
            if self.aux_required(node)? {
                self.forward(aux)?;
            }
        }

        Ok(())
    }

    fn reverse(&mut self, node: &'t Node<T>) -> Result<()> {
        if node.is_leaf() {
            self.offer(node);
            return Ok(());
        }

        let (primary, aux) = match (node.left.as_deref(), node.right.as_deref()) {
            (None, Some(right)) => (right, None),
            (Some(left), None) => (left, None),
            (Some(left), Some(right)) => {
                if self.query.less_on_axis(&node.item, node.dimension)? {
                    (left, Some(right))
                } else {
                    (right, Some(left))
                }
            }
            (None, None) => return Ok(()),
        };

        self.reverse(primary)?;

        self.offer(node);

        if let Some(aux) = aux {
            if self.aux_required(node)? {
                self.reverse(aux)?;
            }
        }

        Ok(())
    }

    /// Drain the heap: neighbors come out farthest first.
    fn drain(mut self) -> Vec<(f64, &'t T)> {
        let mut out = Vec::with_capacity(self.neighbors.len());
        while let Some(Candidate { distance, item }) = self.neighbors.pop() {
            out.push((distance, item));
        }

        out
    }
}

impl<T: SpatialItem> KdTree<T> {
    /// Up to `num_neighbors` items nearest to `query`, ordered from
    /// farthest to nearest.
    ///
    /// An empty tree or a zero neighbor count yields an empty vector.
    pub fn neighbors_search(
        &self,
        query: &T,
        num_neighbors: usize,
        reverse_search: bool,
    ) -> Vec<T> {
        self.search(query, num_neighbors, reverse_search)
            .into_iter()
            .map(|(_, item)| item.clone())
            .collect()
    }

    fn search<'t>(
        &'t self,
        query: &T,
        num_neighbors: usize,
        reverse_search: bool,
    ) -> Vec<(f64, &'t T)> {
        let Some(root) = self.root.as_deref() else {
            return Vec::new();
        };
        if num_neighbors == 0 {
            return Vec::new();
        }

        let mut session = Session::new(query, num_neighbors);
        let outcome = if reverse_search {
            session.reverse(root)
        } else {
            session.forward(root)
        };

        if let Err(error) = outcome {
            warn!(%error, "nearest-neighbor search aborted");
            return Vec::new();
        }

        session.drain()
    }

    /// Shepard (inverse distance weighting) estimate at `target`.
    ///
    /// Runs a bounded kNN search, writes the weighted value into
    /// `target` and returns the neighbors used, farthest first. Weights
    /// are `1 / distance^idw_power`; a tolerance-zero distance either
    /// short-circuits to that neighbor's exact value (feature
    /// `zero-distance-handling`) or is substituted by the comparison
    /// tolerance so the division stays finite.
    pub fn shepard_interpolation(
        &self,
        target: &mut T,
        num_neighbors: usize,
        reverse_search: bool,
        idw_power: f64,
    ) -> Vec<T> {
        let drained = self.search(target, num_neighbors, reverse_search);
        if drained.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(drained.len());
        let mut num = 0.0_f64;
        let mut den = 0.0_f64;

        for (distance, item) in drained {
            #[cfg(feature = "zero-distance-handling")]
            if distance.near_zero() {
                target.copy_value_from(item);
                return vec![item.clone()];
            }

            #[cfg(not(feature = "zero-distance-handling"))]
            let distance = if distance.near_zero() {
                f64::TOLERANCE
            } else {
                distance
            };

            let weight = 1.0 / distance.powf(idw_power);
            num += weight * item.value_f64();
            den += weight;

            out.push(item.clone());
        }

        target.set_value_f64(num / den);

        out
    }
}
