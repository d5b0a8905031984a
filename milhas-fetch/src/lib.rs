// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Milhas Fetch
//!
//! Outbound transport strategies for the Milhas provider client.
//!
//! Every strategy implements the same [`Transport`] contract:
//! `(url, method, headers, body, timeout) -> (status, body) | error`.
//! Strategy selection is caller-driven because availability differs per
//! environment:
//!
//! - [`DirectTransport`] - in-process reqwest call, always available
//! - [`ShellTransport`] - fetch through a locally spawned `curl`, for
//!   environments where the outbound TLS fingerprint must resemble a
//!   command-line client; unavailable in sandboxed hosting
//! - [`HelperTransport`] - forwards the request to a remote helper
//!   service over HTTP; requires a configured endpoint
//!
//! All strategies enforce a hard per-request timeout and report it as a
//! typed [`TransportError::Timeout`], distinct from connection or HTTP
//! status failures. Timeout firing never leaves a transport in a state
//! that blocks subsequent calls.

pub mod direct;
pub mod error;
pub mod helper;
pub mod shell;
pub mod transport;

pub use direct::DirectTransport;
pub use error::TransportError;
pub use helper::{HelperEnvelope, HelperTransport, ProxyFetchRequest};
pub use shell::ShellTransport;
pub use transport::{
    HttpMethod, Transport, TransportKind, TransportRequest, TransportResponse, DEFAULT_TIMEOUT,
};
