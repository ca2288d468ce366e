//! Point-set I/O
//!
//! JSON is the native interchange format: point sets are arrays of
//! objects keyed by configurable axis names.

mod json;

pub use json::{read_points, write_points};
