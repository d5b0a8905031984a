//! Service error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use milhas_smiles::SearchError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error type for request handlers.
///
/// Every variant renders as the `{success: false, error}` envelope so
/// clients never need a second error format.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself was malformed or not allowed.
    #[error("{0}")]
    BadRequest(String),

    /// The provider-side search failed.
    #[error("{0}")]
    Upstream(String),

    /// Unexpected internal failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Query(e) => Self::BadRequest(e.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(err) => {
                error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milhas_core::CoreError;

    #[test]
    fn test_query_error_maps_to_bad_request() {
        let err: AppError =
            SearchError::Query(CoreError::InvalidQuery("no adults".to_string())).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_token_error_maps_to_upstream() {
        let err: AppError = SearchError::TokenNotFound.into();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
