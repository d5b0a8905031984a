//! Remote helper transport.
//!
//! Forwards a request to a helper service that performs the actual
//! provider fetch and replies with a `{success, data|error, status}`
//! envelope. The helper speaks the same contract the `milhas-server`
//! proxy exposes on `POST /search`, so any deployment of that binary can
//! act as the helper.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::transport::{Transport, TransportKind, TransportRequest, TransportResponse};

/// Extra slack granted on top of the forwarded timeout, covering the
/// helper's own network hop.
const HELPER_TIMEOUT_SLACK: std::time::Duration = std::time::Duration::from_secs(5);

// ============================================================================
// Wire Types
// ============================================================================

/// Body of a proxied fetch request, as the helper expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyFetchRequest {
    /// Target URL for the helper to fetch.
    pub url: String,
    /// HTTP method name.
    #[serde(default)]
    pub method: Option<String>,
    /// Header map to apply to the proxied request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Scrape the session token from the response instead of returning
    /// the raw body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_token: Option<bool>,
    /// Timeout in milliseconds for the proxied fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Envelope the helper replies with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperEnvelope {
    /// Whether the proxied fetch succeeded.
    pub success: bool,
    /// Response body (or extracted token) on success.
    #[serde(default)]
    pub data: Option<String>,
    /// Failure message on error.
    #[serde(default)]
    pub error: Option<String>,
    /// Upstream HTTP status, when known.
    #[serde(default)]
    pub status: Option<u16>,
}

// ============================================================================
// Helper Transport
// ============================================================================

/// Transport that forwards requests through a remote helper service.
#[derive(Debug, Clone)]
pub struct HelperTransport {
    base: Url,
    http: reqwest::Client,
}

impl HelperTransport {
    /// Creates a helper transport for the given base endpoint.
    pub fn new(base: Url) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|e| panic!("Failed to create HTTP client: {e}"));

        Self { base, http }
    }

    /// Parses the base endpoint from a string.
    pub fn from_endpoint(endpoint: &str) -> Result<Self, TransportError> {
        let base = Url::parse(endpoint).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Ok(Self::new(base))
    }

    /// The configured helper base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn search_url(&self) -> Result<Url, TransportError> {
        self.base
            .join("search")
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl Transport for HelperTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Helper
    }

    async fn is_available(&self) -> bool {
        // Configuration implies availability; reachability is learned on send.
        true
    }

    #[instrument(skip(self, req), fields(url = %req.url, helper = %self.base))]
    async fn send(&self, req: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let wire = ProxyFetchRequest {
            url: req.url.clone(),
            method: Some(req.method.as_str().to_string()),
            headers: req.headers.iter().cloned().collect(),
            body: req.body.clone(),
            extract_token: None,
            timeout: Some(u64::try_from(req.timeout.as_millis()).unwrap_or(u64::MAX)),
        };

        debug!("Forwarding request to helper");

        let budget = req.timeout + HELPER_TIMEOUT_SLACK;
        let fut = async {
            let response = self
                .http
                .post(self.search_url()?.as_str())
                .json(&wire)
                .send()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;
            response
                .json::<HelperEnvelope>()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))
        };

        let envelope = match tokio::time::timeout(budget, fut).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout(req.timeout)),
        };

        if !envelope.success {
            return Err(TransportError::HelperRejected(
                envelope.error.unwrap_or_else(|| "Unknown helper error".to_string()),
            ));
        }

        Ok(TransportResponse {
            status: envelope.status.unwrap_or(200),
            body: envelope.data.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
