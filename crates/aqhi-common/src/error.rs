//! Error types shared by the AQHI crates.

use thiserror::Error;

/// Result type alias using AqhiError.
pub type AqhiResult<T> = Result<T, AqhiError>;

/// Domain errors that are not specific to one pipeline stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AqhiError {
    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl AqhiError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
