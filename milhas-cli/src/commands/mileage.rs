//! Mileage command - miles balance via the credential-sync collaborator.

use anyhow::Result;
use clap::Args;
use milhas_smiles::MileageClient;
use tracing::info;
use url::Url;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the mileage command.
#[derive(Args)]
pub struct MileageArgs {
    /// Credential-sync collaborator endpoint.
    #[arg(long)]
    pub url: Url,

    /// Loyalty account username.
    #[arg(long, short)]
    pub username: String,

    /// Loyalty account password.
    #[arg(long, short)]
    pub password: String,
}

/// Runs the mileage command.
pub async fn run(args: &MileageArgs, cli: &Cli) -> Result<()> {
    info!(endpoint = %args.url, "Syncing miles balance");

    let client = MileageClient::new(args.url.clone());
    let balance = client.sync(&args.username, &args.password).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_balance(&balance));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_balance(&balance)?);
        }
    }

    if !balance.success {
        anyhow::bail!(
            "Sync failed: {}",
            balance.message.unwrap_or_else(|| "no details".to_string())
        );
    }
    Ok(())
}
