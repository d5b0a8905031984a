// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Milhas server binary.
//!
//! Serves the allow-listed fetch proxy (`POST /search`) and the offers
//! search endpoint (`GET /offers/search`).

use anyhow::Context as _;
use clap::Parser;
use milhas_server::{app, AppState};
use milhas_smiles::SearchConfig;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Milhas proxy and search server.
#[derive(Parser)]
#[command(name = "milhas-server")]
#[command(about = "HTTP proxy and search service for the Milhas client")]
#[command(version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, short, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "milhas_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = SearchConfig::from_env();
    if let Some(helper) = &config.helper_endpoint {
        tracing::info!(helper = %helper, "Remote helper configured");
    }

    let state = AppState::new(&config);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cli.host, cli.port))?;
    tracing::info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
