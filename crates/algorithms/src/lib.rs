//! # kdinterp algorithms
//!
//! Spatial indexing and interpolation for scattered point data:
//!
//! - **kdtree**: dynamic k-d tree with insert, remove and bounded
//!   k-nearest-neighbor search in forward and reverse variants
//! - **interpolation**: Shepard inverse-distance weighting over the
//!   neighbors an index query returns

pub mod interpolation;
pub mod kdtree;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{interpolate_points, shepard_value, InterpolationParams};
    pub use crate::kdtree::KdTree;
    pub use kdinterp_core::prelude::*;
}
