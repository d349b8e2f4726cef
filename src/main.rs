//! TigerTrust RSE command line
//!
//! Scores one wallet and prints the result as JSON:
//!   tigertrust_rse score <WALLET> [--network devnet] [--rpc-url URL] [--pages N]
//!   tigertrust_rse check [--network devnet] [--rpc-url URL]
//!
//! Configuration is read from the environment (and `.env`) first; flags win.

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use tigertrust_rse::providers::mask_url;
use tigertrust_rse::{EngineConfig, Network, SolanaLedgerClient, TrustScorer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tigertrust_rse", version, about = "Wallet trust scoring for micro-lending")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a wallet and print score, tier and features
    Score {
        /// Base58 wallet address
        wallet: String,
        #[command(flatten)]
        ledger: LedgerArgs,
        /// Signature pages to follow (1000 signatures each by default)
        #[arg(long)]
        pages: Option<usize>,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Verify the RPC endpoint answers and print the effective configuration
    Check {
        #[command(flatten)]
        ledger: LedgerArgs,
    },
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// mainnet-beta, devnet or testnet
    #[arg(long)]
    network: Option<Network>,
    /// Explicit JSON-RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,
}

impl LedgerArgs {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(network) = self.network {
            config.ledger.network = network;
            config.ledger.rpc_url = network.default_rpc_url().to_string();
        }
        if let Some(url) = &self.rpc_url {
            config.ledger.rpc_url = url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env()?;

    match cli.command {
        Command::Score {
            wallet,
            ledger,
            pages,
            compact,
        } => {
            ledger.apply(&mut config);
            if let Some(pages) = pages {
                config.ledger.max_signature_pages = pages;
            }

            let scorer = TrustScorer::from_config(&config)?;
            let result = scorer.score_wallet(&wallet).await?;

            let output = if compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{}", output);
        }
        Command::Check { ledger } => {
            ledger.apply(&mut config);
            config.validate()?;

            let client = SolanaLedgerClient::new(&config.ledger)?;
            let version = client.version().await?;
            info!(version = %version, "RPC endpoint reachable");

            let report = serde_json::json!({
                "network": config.ledger.network.name(),
                "rpcUrl": mask_url(&config.ledger.rpc_url),
                "nodeVersion": version,
                "signaturePageSize": config.ledger.signature_page_size,
                "maxSignaturePages": config.ledger.max_signature_pages,
                "policyVersion": config.scoring.version,
                "tiers": config.tiers.thresholds(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
