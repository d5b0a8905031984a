//! Smiles client error types.

use milhas_core::CoreError;
use milhas_fetch::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Error type for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search query failed validation.
    #[error("Invalid query: {0}")]
    Query(#[from] CoreError),

    /// A transport-level timeout. Terminal, never retried.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection/DNS/protocol failure below the HTTP layer.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The provider answered with an unexpected HTTP status.
    #[error("Provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The token page did not contain a search token.
    #[error("Search token not found in token page")]
    TokenNotFound,

    /// The provider rejected the session token. Recovered once by
    /// clearing the token; a second rejection surfaces this error.
    #[error("Authorization rejected: {0}")]
    AuthRejected(String),

    /// The offers payload could not be parsed at all.
    #[error("Parse failure: {0}")]
    Parse(String),
}

impl From<TransportError> for SearchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(d) => Self::Timeout(d),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Error type for the credential-sync (mileage balance) client.
#[derive(Debug, Error)]
pub enum MileageError {
    /// The sync exceeded its execution ceiling.
    #[error("Mileage sync timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP-level failure talking to the collaborator.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The collaborator's response could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
