// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Milhas Server
//!
//! Inbound HTTP surface for the Milhas client:
//!
//! - `POST /search` - allow-listed fetch proxy speaking the
//!   `{success, data|error, status}` envelope. Any deployment of this
//!   binary can therefore act as the remote helper the search client
//!   falls back on.
//! - `GET /offers/search` - runs a full offers search through the
//!   orchestrator and returns `{success, content, error?}`.
//!
//! Credential sync is deliberately not exposed: it stays an outbound
//! client-side call.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod offers;
pub mod proxy;
pub mod state;

pub use error::AppError;
pub use state::AppState;

/// Builds the service router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/search", post(proxy::proxy_search))
        .route("/offers/search", get(offers::search_offers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
