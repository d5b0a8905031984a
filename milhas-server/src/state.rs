//! Shared service state.

use milhas_fetch::{DirectTransport, Transport};
use milhas_smiles::{SearchClient, SearchConfig};
use std::sync::Arc;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator backing `GET /offers/search`.
    pub client: Arc<SearchClient>,
    /// Transport executing proxied `POST /search` fetches.
    pub transport: Arc<dyn Transport>,
}

impl AppState {
    /// Creates the state for a configuration.
    ///
    /// The proxy always fetches directly: a helper forwarding to another
    /// helper would only add hops.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: Arc::new(SearchClient::new(config)),
            transport: Arc::new(DirectTransport::new()),
        }
    }
}
