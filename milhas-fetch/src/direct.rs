//! Direct in-process HTTP transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::transport::{HttpMethod, Transport, TransportKind, TransportRequest, TransportResponse};

/// Direct transport backed by an in-process reqwest client.
///
/// The per-request timeout is enforced with `tokio::time::timeout`
/// wrapping the entire send-and-read, so a stalled server cannot hold a
/// call past its budget and the client remains reusable afterwards.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    inner: Client,
}

impl DirectTransport {
    /// Creates a new direct transport.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This should only occur
    /// if the system's TLS/SSL configuration is fundamentally broken,
    /// making network operations impossible.
    pub fn new() -> Self {
        let client = Client::builder()
            .build()
            .unwrap_or_else(|e| {
                panic!(
                    "Failed to create HTTP client: {e}. \
                    This usually indicates a broken TLS/SSL configuration."
                )
            });

        Self { inner: client }
    }

    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl Default for DirectTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    async fn is_available(&self) -> bool {
        true
    }

    #[instrument(skip(self, req), fields(url = %req.url, method = req.method.as_str()))]
    async fn send(&self, req: &TransportRequest) -> Result<TransportResponse, TransportError> {
        Url::parse(&req.url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let headers = Self::header_map(&req.headers)?;

        let mut builder = match req.method {
            HttpMethod::Get => self.inner.get(&req.url),
            HttpMethod::Post => self.inner.post(&req.url),
        };
        builder = builder.headers(headers).timeout(req.timeout);
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        debug!("Sending direct request");

        let fut = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(TransportResponse { status, body })
        };

        match tokio::time::timeout(req.timeout, fut).await {
            Ok(Ok(response)) => {
                debug!(status = response.status, "Response received");
                Ok(response)
            }
            Ok(Err(e)) if e.is_timeout() => Err(TransportError::Timeout(req.timeout)),
            Ok(Err(e)) => Err(TransportError::Connection(e.to_string())),
            Err(_) => Err(TransportError::Timeout(req.timeout)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
