//! Core error types for Milhas.

use thiserror::Error;

/// Core error type for Milhas operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A search query failed validation.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
