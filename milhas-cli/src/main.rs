// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Milhas CLI - award flight search from the command line.
//!
//! # Examples
//!
//! ```bash
//! # One-way search
//! milhas search GRU SSA 2025-03-01
//!
//! # Round trip
//! milhas search GRU SSA 2025-03-01 --return-date 2025-03-10
//!
//! # Fetch through a local curl instead of in-process HTTP
//! milhas search GRU SSA 2025-03-01 --transport shell
//!
//! # Route through a remote helper
//! milhas search GRU SSA 2025-03-01 --helper-url http://helper.internal:8787/
//!
//! # JSON output
//! milhas search GRU SSA 2025-03-01 --format json --pretty
//!
//! # Miles balance via the credential-sync collaborator
//! milhas mileage --url http://sync.internal:9000/mileage --username u --password p
//!
//! # Inspect or drop the cached session token
//! milhas token
//! milhas token --clear
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{mileage, search, token};

// ============================================================================
// CLI Definition
// ============================================================================

/// Milhas CLI - award flight search for the Smiles program.
#[derive(Parser)]
#[command(name = "milhas")]
#[command(about = "Award flight search for the Smiles program")]
#[command(version)]
#[command(author = "Milhas Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search award flight offers.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// Fetch the miles balance via the credential-sync collaborator.
    #[command(visible_alias = "m")]
    Mileage(mileage::MileageArgs),

    /// Show or clear the cached session token.
    #[command(visible_alias = "t")]
    Token(token::TokenArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Query failed validation.
    InvalidQuery = 2,
    /// Provider rejected the session repeatedly.
    AuthRejected = 3,
    /// Timeout.
    Timeout = 4,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("milhas=debug,info")
    } else {
        EnvFilter::new("milhas=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Search(args) => search::run(args, &cli).await,
        Commands::Mileage(args) => mileage::run(args, &cli).await,
        Commands::Token(args) => token::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

/// Maps an error chain to an exit code.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    use milhas_smiles::{MileageError, SearchError};

    match err.downcast_ref::<SearchError>() {
        Some(SearchError::Query(_)) => ExitCode::InvalidQuery,
        Some(SearchError::AuthRejected(_)) => ExitCode::AuthRejected,
        Some(SearchError::Timeout(_)) => ExitCode::Timeout,
        Some(_) => ExitCode::Error,
        None => match err.downcast_ref::<MileageError>() {
            Some(MileageError::Timeout(_)) => ExitCode::Timeout,
            _ => ExitCode::Error,
        },
    }
}
