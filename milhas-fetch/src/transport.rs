//! Transport trait and request/response types.
//!
//! A transport represents one mechanism for issuing an outbound HTTP
//! request. All mechanisms expose the same contract so the orchestrator
//! can swap them without touching control flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::TransportError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Transport Kind
// ============================================================================

/// The kind of mechanism a transport uses.
///
/// Selection is caller-driven, never auto-detected: each kind has
/// different availability (the shell strategy needs a `curl` binary, the
/// helper needs a configured endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Direct in-process HTTP call.
    Direct,
    /// Locally shell-invoked fetch (`curl`).
    Shell,
    /// Remote helper service reachable over HTTP.
    Helper,
}

impl TransportKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Shell => "Shell",
            Self::Helper => "Helper",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP methods the gateway supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request.
    #[default]
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

// ============================================================================
// Request / Response
// ============================================================================

/// An outbound request, transport-agnostic.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<String>,
    /// Hard timeout for the whole call.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Creates a GET request with the default timeout.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a POST request with the default timeout.
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: Vec::new(),
            body: Some(body.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a batch of headers.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The raw result of a transport call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// A strategy for issuing an outbound HTTP request.
///
/// ## Implementing a Transport
///
/// ```ignore
/// struct RecordingTransport;
///
/// #[async_trait]
/// impl Transport for RecordingTransport {
///     fn kind(&self) -> TransportKind {
///         TransportKind::Direct
///     }
///
///     async fn is_available(&self) -> bool {
///         true
///     }
///
///     async fn send(&self, req: &TransportRequest)
///         -> Result<TransportResponse, TransportError> {
///         // issue the request and map failures to TransportError
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// The kind of mechanism this transport uses.
    fn kind(&self) -> TransportKind;

    /// Quick availability check (no network round trip).
    async fn is_available(&self) -> bool;

    /// Issues the request, honoring `req.timeout` as a hard ceiling.
    async fn send(&self, req: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

// ============================================================================
// Tests
// ============================================================================
