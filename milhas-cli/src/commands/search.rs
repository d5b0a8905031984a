//! Search command - run an offers search and display the results.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use milhas_core::SearchQuery;
use milhas_fetch::TransportKind;
use milhas_smiles::{SearchClient, SearchConfig, HELPER_URL_ENV};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Origin airport code or label ("GRU", "São Paulo (GRU)").
    pub origin: String,

    /// Destination airport code or label.
    pub destination: String,

    /// Outbound date (YYYY-MM-DD).
    pub departure_date: NaiveDate,

    /// Inbound date; implies a round trip.
    #[arg(long, short = 'r')]
    pub return_date: Option<NaiveDate>,

    /// Adult passengers.
    #[arg(long, default_value_t = 1)]
    pub adults: u32,

    /// Child passengers.
    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Lap infants.
    #[arg(long, default_value_t = 0)]
    pub infants: u32,

    /// Transport strategy for provider requests.
    #[arg(long, default_value = "direct")]
    pub transport: TransportArg,

    /// Remote helper endpoint (overrides MILHAS_HELPER_URL).
    #[arg(long)]
    pub helper_url: Option<Url>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

/// Transport strategies selectable from the command line.
///
/// The helper strategy is not listed: configuring a helper URL already
/// routes the search through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// In-process HTTP call.
    Direct,
    /// Locally spawned `curl`.
    Shell,
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Direct => Self::Direct,
            TransportArg::Shell => Self::Shell,
        }
    }
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<()> {
    let query = build_query(args);
    let config = build_config(args);

    info!(
        origin = %query.origin,
        destination = %query.destination,
        transport = %config.transport,
        "Searching offers"
    );

    let client = SearchClient::new(&config);
    let parsed = client.search(&query).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_offers(&query, &parsed));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_offers(&parsed)?);
        }
    }

    Ok(())
}

fn build_query(args: &SearchArgs) -> SearchQuery {
    let mut query = match args.return_date {
        Some(ret) => SearchQuery::round_trip(
            args.origin.clone(),
            args.destination.clone(),
            args.departure_date,
            ret,
        ),
        None => SearchQuery::one_way(
            args.origin.clone(),
            args.destination.clone(),
            args.departure_date,
        ),
    };
    query.adults = args.adults;
    query.children = args.children;
    query.infants = args.infants;
    query
}

fn build_config(args: &SearchArgs) -> SearchConfig {
    let mut config = SearchConfig::from_env();
    config.transport = args.transport.into();
    config.timeout = Duration::from_secs(args.timeout);
    if let Some(helper) = &args.helper_url {
        config.helper_endpoint = Some(helper.clone());
    }
    if config.helper_endpoint.is_some() && args.helper_url.is_none() {
        info!("Using helper endpoint from {HELPER_URL_ENV}");
    }
    config
}

// ============================================================================
// Tests
// ============================================================================
