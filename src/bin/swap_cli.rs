//! Swap CLI
//!
//! Command-line surface for the swap escrow client: list live offers, make
//! a new offer, take an offer, or refund one of your own.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin swap_cli -- list
//! cargo run --bin swap_cli -- make --from SOL --to USDC --amount 1.5 --receive 200
//! cargo run --bin swap_cli -- take --escrow <ADDRESS>
//! cargo run --bin swap_cli -- refund --escrow <ADDRESS>
//! ```
//!
//! The config path defaults to `config/swap.toml` and can be overridden with
//! `--config` or the `SWAP_CONFIG_PATH` environment variable.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use swap_client::{
    tokens::parse_amount, Offer, SwapConfig, SwapService,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "swap_cli")]
#[command(about = "Client for the peer-to-peer token swap escrow program")]
struct Args {
    /// Path to the configuration file (default: config/swap.toml or SWAP_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List live offers, newest first
    List,
    /// Create a new offer
    Make {
        /// Symbol of the token you deposit (e.g., SOL)
        #[arg(long)]
        from: String,
        /// Symbol of the token you want in return
        #[arg(long)]
        to: String,
        /// Deposit amount, decimal (e.g., 1.5)
        #[arg(long)]
        amount: String,
        /// Asked amount, decimal
        #[arg(long)]
        receive: String,
        /// Escrow seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Take an offer by its escrow address
    Take {
        #[arg(long)]
        escrow: String,
    },
    /// Refund an offer you made, by its escrow address
    Refund {
        #[arg(long)]
        escrow: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let config = SwapConfig::load_from_path(args.config.as_deref())
        .context("failed to load configuration")?;
    let service = SwapService::new(&config).context("failed to create swap service")?;

    match args.command {
        Command::List => list(&service).await,
        Command::Make {
            from,
            to,
            amount,
            receive,
            seed,
        } => make(&service, &from, &to, &amount, &receive, seed).await,
        Command::Take { escrow } => take(&service, &escrow).await,
        Command::Refund { escrow } => refund(&service, &escrow).await,
    }
}

async fn list(service: &SwapService) -> Result<()> {
    let offers = service.list_offers().await?;
    if offers.is_empty() {
        println!("No live offers.");
        return Ok(());
    }
    for offer in &offers {
        let give = symbol_for(service, &offer.record.mint_a);
        let want = symbol_for(service, &offer.record.mint_b);
        let want_decimals = service.registry().decimals_for(&offer.record.mint_b);
        let want_amount =
            swap_client::tokens::ui_amount(offer.record.receive, want_decimals);
        println!(
            "{}  {} {} -> {} {}  (maker {})",
            offer.escrow, offer.vault_amount, give, want_amount, want, offer.record.maker
        );
    }
    Ok(())
}

async fn make(
    service: &SwapService,
    from: &str,
    to: &str,
    amount: &str,
    receive: &str,
    seed: Option<u64>,
) -> Result<()> {
    let registry = service.registry();
    let from_token = registry
        .by_symbol(from)
        .with_context(|| format!("unknown token symbol '{from}'"))?
        .clone();
    let to_token = registry
        .by_symbol(to)
        .with_context(|| format!("unknown token symbol '{to}'"))?
        .clone();

    let deposit = parse_amount(amount, from_token.decimals)?;
    let asked = parse_amount(receive, to_token.decimals)?;
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    let (escrow, signature) = service
        .make_offer(seed, &from_token.mint, &to_token.mint, deposit, asked)
        .await?;
    info!("offer created: escrow={}, tx={}", escrow, signature);
    println!("Offer created: {escrow}");
    Ok(())
}

async fn take(service: &SwapService, escrow: &str) -> Result<()> {
    let offer = find_offer(service, escrow).await?;
    let signature = service.take_offer(&offer).await?;
    println!("Swap completed: {signature}");
    Ok(())
}

async fn refund(service: &SwapService, escrow: &str) -> Result<()> {
    let offer = find_offer(service, escrow).await?;
    let signature = service.refund_offer(&offer).await?;
    println!("Offer refunded: {signature}");
    Ok(())
}

/// Resolves an escrow address against the live offer list.
async fn find_offer(service: &SwapService, escrow: &str) -> Result<Offer> {
    let address = Pubkey::from_str(escrow).context("invalid escrow address")?;
    let offers = service.list_offers().await?;
    match offers.into_iter().find(|o| o.escrow == address) {
        Some(offer) => Ok(offer),
        None => bail!("no live offer at {address}"),
    }
}

fn symbol_for(service: &SwapService, mint: &Pubkey) -> String {
    service
        .registry()
        .by_mint(mint)
        .map(|t| t.symbol.clone())
        .unwrap_or_else(|| mint.to_string())
}
