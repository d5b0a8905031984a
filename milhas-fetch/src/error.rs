//! Transport error types.

use std::time::Duration;
use thiserror::Error;

/// Error type for transport operations.
///
/// `Timeout` is deliberately distinct from `Connection` and from HTTP
/// status handling (statuses are returned in the response, not as
/// errors) so callers can apply different recovery policies.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded its timeout budget.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS, or protocol failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value was malformed.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The shell fetch command is not installed.
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// The shell fetch command exited with a failure.
    #[error("Command exited with code {code}: {stderr}")]
    CommandFailed {
        /// Exit code from the process.
        code: i32,
        /// Standard error output.
        stderr: String,
    },

    /// The remote helper reported a failure.
    #[error("Helper rejected request: {0}")]
    HelperRejected(String),

    /// JSON error while speaking to the remote helper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the shell strategy.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
