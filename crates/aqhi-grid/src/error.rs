//! Error types for grid building and interpolation.

use aqhi_common::AqhiError;
use thiserror::Error;

/// Errors that can occur while building or interpolating one region grid.
///
/// `Clone` so a shared grid failure can be reported for both variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Cell size is zero, negative or not a number.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// The region geometry has no extent.
    #[error("region '{0}' has no polygonal extent")]
    EmptyRegion(String),

    /// The lattice over the region bounding box is larger than allowed.
    #[error("grid of {requested} cells exceeds the limit of {limit}")]
    TooManyCells { requested: u64, limit: u64 },

    /// Configuration rejected by validation.
    #[error("configuration error: {0}")]
    InvalidConfig(#[from] AqhiError),
}

impl GridError {
    /// Create an EmptyRegion error.
    pub fn empty_region(name: impl Into<String>) -> Self {
        Self::EmptyRegion(name.into())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
