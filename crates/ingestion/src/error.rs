//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while loading sources or writing outputs.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected structure in {context}: {message}")]
    UnexpectedStructure { context: String, message: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl IngestionError {
    /// Create a Fetch error.
    pub fn fetch(location: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create an UnexpectedStructure error.
    pub fn unexpected_structure(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedStructure {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
