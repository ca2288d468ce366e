//! # kdinterp core
//!
//! Core types and I/O for the kdinterp interpolation toolkit.
//!
//! This crate provides:
//! - [`Point`]: generic N-dimensional sample point
//! - [`numeric`]: tolerance comparisons and overflow-free widening casts
//! - [`SpatialItem`]: the capability trait spatial indexes consume
//! - [`io`]: JSON point-set reading and writing

pub mod error;
pub mod io;
pub mod numeric;
pub mod point;

pub use error::{Error, Result};
pub use point::{Point, SpatialItem};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::numeric::{Coord, Scalar, Value};
    pub use crate::point::{Point, SpatialItem};
}
