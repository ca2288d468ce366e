//! Shepard inverse-distance-weighted interpolation
//!
//! Estimates a value at an unknown location as the weighted average of
//! nearby sample values, with weights inversely proportional to
//! distance raised to a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use kdinterp_core::numeric::Scalar;
#[cfg(not(feature = "zero-distance-handling"))]
use kdinterp_core::numeric::Tolerance;
use kdinterp_core::SpatialItem;

use crate::kdtree::KdTree;

/// Parameters for a batch interpolation run
#[derive(Debug, Clone)]
pub struct InterpolationParams {
    /// Neighbors considered per unknown point (default: 100)
    pub num_neighbors: usize,
    /// Use the leaves-first search variant (default: false)
    pub reverse_search: bool,
    /// IDW power parameter (default: 2.0). Higher values give more
    /// weight to nearby points; values at or below zero are legal but
    /// degenerate.
    pub idw_power: f64,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            num_neighbors: 100,
            reverse_search: false,
            idw_power: 2.0,
        }
    }
}

/// Weighted value of `target` over an already-selected neighbor set.
///
/// Distances are recomputed per neighbor; a tolerance-zero distance
/// either returns that neighbor's value directly (feature
/// `zero-distance-handling`) or is substituted by the comparison
/// tolerance. At least one neighbor is expected; an empty slice yields
/// NaN.
pub fn shepard_value<T: SpatialItem>(target: &T, neighbors: &[T], idw_power: f64) -> f64 {
    let mut num = 0.0_f64;
    let mut den = 0.0_f64;

    for neighbor in neighbors {
        let distance = neighbor.distance(target);

        #[cfg(feature = "zero-distance-handling")]
        if distance.near_zero() {
            return neighbor.value_f64();
        }

        #[cfg(not(feature = "zero-distance-handling"))]
        let distance = if distance.near_zero() {
            f64::TOLERANCE
        } else {
            distance
        };

        let weight = 1.0 / distance.powf(idw_power);
        num += weight * neighbor.value_f64();
        den += weight;
    }

    num / den
}

/// Interpolate every point in `points` against the indexed samples,
/// strictly sequentially, writing each estimate back in place.
pub fn interpolate_points<T: SpatialItem>(
    tree: &KdTree<T>,
    points: &mut [T],
    params: &InterpolationParams,
) {
    for point in points.iter_mut() {
        tree.shepard_interpolation(
            point,
            params.num_neighbors,
            params.reverse_search,
            params.idw_power,
        );
    }
}
