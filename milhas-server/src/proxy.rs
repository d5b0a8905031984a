//! Allow-listed fetch proxy.
//!
//! `POST /search` executes an outbound fetch on behalf of a caller that
//! cannot reach the provider itself (sandboxed hosting, CORS). The
//! target URL is restricted to provider hosts; this is a provider proxy,
//! not an open one.

use axum::extract::State;
use axum::Json;
use milhas_fetch::{HelperEnvelope, ProxyFetchRequest, TransportRequest};
use milhas_smiles::extract_search_token;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Hosts a proxied fetch may target.
const ALLOWED_HOST_SUFFIX: &str = ".smiles.com.br";
const ALLOWED_HOST_APEX: &str = "smiles.com.br";

/// Whether a proxied fetch may target this URL.
fn url_allowed(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host_str() {
        Some(host) => host == ALLOWED_HOST_APEX || host.ends_with(ALLOWED_HOST_SUFFIX),
        None => false,
    }
}

/// Executes a proxied fetch and wraps the result in the helper envelope.
#[instrument(skip(state, req), fields(url = %req.url))]
pub async fn proxy_search(
    State(state): State<AppState>,
    Json(req): Json<ProxyFetchRequest>,
) -> Result<Json<HelperEnvelope>, AppError> {
    let url = Url::parse(&req.url)
        .map_err(|e| AppError::BadRequest(format!("Invalid url: {e}")))?;
    if !url_allowed(&url) {
        return Err(AppError::BadRequest(format!(
            "Host not allowed: {}",
            url.host_str().unwrap_or("<none>")
        )));
    }

    let mut transport_req = match req.method.as_deref() {
        Some("POST") => TransportRequest::post(req.url.clone(), req.body.unwrap_or_default()),
        _ => TransportRequest::get(req.url.clone()),
    };
    transport_req = transport_req.with_headers(req.headers);
    if let Some(ms) = req.timeout {
        transport_req = transport_req.with_timeout(Duration::from_millis(ms));
    }

    let resp = match state.transport.send(&transport_req).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, "Proxied fetch failed");
            return Ok(Json(HelperEnvelope {
                success: false,
                data: None,
                error: Some(e.to_string()),
                status: None,
            }));
        }
    };

    if req.extract_token == Some(true) {
        let envelope = match extract_search_token(&resp.body) {
            Some(token) => HelperEnvelope {
                success: true,
                data: Some(token),
                error: None,
                status: Some(resp.status),
            },
            None => HelperEnvelope {
                success: false,
                data: None,
                error: Some("Search token not found in response".to_string()),
                status: Some(resp.status),
            },
        };
        return Ok(Json(envelope));
    }

    debug!(status = resp.status, "Proxied fetch completed");
    let success = resp.is_success();
    Ok(Json(HelperEnvelope {
        success,
        data: Some(resp.body),
        error: if success {
            None
        } else {
            Some(format!("HTTP {}", resp.status))
        },
        status: Some(resp.status),
    }))
}

// ============================================================================
// Tests
// ============================================================================
