//! Token command - inspect or clear the cached session token.

use anyhow::Result;
use clap::Args;
use milhas_smiles::TokenStore;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the token command.
#[derive(Args)]
pub struct TokenArgs {
    /// Drop the cached token instead of showing it.
    #[arg(long)]
    pub clear: bool,
}

/// Runs the token command.
pub fn run(args: &TokenArgs, cli: &Cli) -> Result<()> {
    let store = TokenStore::new();

    if args.clear {
        store.clear();
        if !cli.quiet {
            println!("Session token cleared");
        }
        return Ok(());
    }

    let token = store.get();
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_token(token.as_ref()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_token(token.as_ref())?);
        }
    }
    Ok(())
}
