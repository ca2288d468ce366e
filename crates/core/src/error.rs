//! Error types for kdinterp

use thiserror::Error;

/// Main error type for kdinterp operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Axis {axis} is out of range for a {axes}-axis point")]
    AxisOutOfRange { axis: usize, axes: usize },

    #[error("Invalid point set: {0}")]
    InvalidPointSet(String),
}

/// Result type alias for kdinterp operations
pub type Result<T> = std::result::Result<T, Error>;
