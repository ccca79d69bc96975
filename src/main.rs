//! dust-stake command line.
//!
//! # Commands
//!
//! ```text
//! scan     ETH + watched ERC-20 balances, dust selection, DOT estimate
//! balance  Polkadot address and free balance
//! bridge   Wormhole transfer to the Polkadot account only
//! stake    bond + nominate from the existing Polkadot balance
//! run      bridge, wait for arrival, then stake
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::str::FromStr;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use subxt::utils::AccountId32;

use dust_stake::bridge::{BridgeRequest, BridgeToken};
use dust_stake::config::{load_or_default, validation::MAX_NOMINATIONS, AppConfig, Secrets};
use dust_stake::dust::{AggregationPlan, DustScanner, Selection};
use dust_stake::ethereum::{EthereumClient, Wallet};
use dust_stake::lifecycle::{spawn_signal_handler, Shutdown};
use dust_stake::observability::{init_logging, metrics};
use dust_stake::orchestrator::run::{build_bridge, connect_polkadot, load_account, token_decimals};
use dust_stake::orchestrator::{run_from_config, StatusReporter};
use dust_stake::units::{format_planck, parse_amount, to_planck};

#[derive(Parser)]
#[command(name = "dust-stake")]
#[command(about = "Aggregate Ethereum dust and stake it on Polkadot", long_about = None)]
struct Cli {
    /// Configuration file (defaults are used when it does not exist).
    #[arg(short, long, default_value = "dust-stake.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List balances and the dust aggregation plan
    Scan {
        /// Account to scan (defaults to the configured wallet)
        #[arg(long)]
        owner: Option<Address>,
        /// Flip the selection of a token (repeatable)
        #[arg(long = "toggle")]
        toggle: Vec<String>,
    },
    /// Show the Polkadot account and its free balance
    Balance,
    /// Bridge `flow.amount` of `flow.token` to the Polkadot account
    Bridge {
        /// Override `flow.token` ("ETH" or an ERC-20 address)
        #[arg(long)]
        token: Option<String>,
        /// Override `flow.amount`
        #[arg(long)]
        amount: Option<String>,
    },
    /// Bond and nominate from the current Polkadot balance
    Stake {
        /// Amount in DOT units
        #[arg(long)]
        amount: String,
        /// Validator stash (repeatable; defaults to `flow.validators` or active validators)
        #[arg(long = "validator")]
        validators: Vec<String>,
    },
    /// Bridge, wait for arrival, then stake
    Run,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(&cli.config)?;

    init_logging(&config.observability);
    tracing::info!(config = %cli.config.display(), "dust-stake v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let secrets = Secrets::from_env();

    match cli.command {
        Commands::Scan { owner, toggle } => scan(&config, &secrets, owner, &toggle).await,
        Commands::Balance => balance(&config, &secrets).await,
        Commands::Bridge { token, amount } => bridge(config, &secrets, token, amount).await,
        Commands::Stake { amount, validators } => stake(&config, &secrets, &amount, validators).await,
        Commands::Run => run(&config, &secrets).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn scan(
    config: &AppConfig,
    secrets: &Secrets,
    owner: Option<Address>,
    toggle: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let owner = match owner {
        Some(owner) => owner,
        None => Wallet::from_private_key(secrets.eth_private_key()?, config.ethereum.chain_id)?.address(),
    };

    let client = EthereumClient::new(config.ethereum.clone()).await?;
    let scanner = DustScanner::new(client, &config.dust)?;
    let mut selection = Selection::new(scanner.scan(owner).await?);
    for symbol in toggle {
        selection.toggle(symbol)?;
    }

    let plan = match AggregationPlan::from_selection(&selection, config.dust.dot_price_usd) {
        Ok(plan) => Some(plan),
        Err(e) => {
            tracing::info!(reason = %e, "No aggregation plan");
            None
        }
    };

    print_json(&json!({
        "owner": owner,
        "holdings": selection.holdings(),
        "plan": plan,
    }))
}

async fn balance(config: &AppConfig, secrets: &Secrets) -> Result<(), Box<dyn std::error::Error>> {
    let client = connect_polkadot(config).await?;
    let account = load_account(secrets)?;
    let free = client.free_balance(account.account_id()).await?;

    print_json(&json!({
        "address": account.address(),
        "free_planck": free.to_string(),
        "free": format_planck(free, config.polkadot.token_decimals),
        "symbol": config.polkadot.token_symbol,
    }))
}

async fn bridge(
    mut config: AppConfig,
    secrets: &Secrets,
    token: Option<String>,
    amount: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(token) = token {
        config.flow.token = token;
    }
    if let Some(amount) = amount {
        config.flow.amount = amount;
    }

    let account = load_account(secrets)?;
    let (client, bridge) = build_bridge(&config, secrets).await?;
    let token = BridgeToken::from_str(&config.flow.token)?;
    let decimals = token_decimals(&client, token).await?;

    let receipt = bridge
        .bridge(&BridgeRequest {
            token,
            amount: parse_amount(&config.flow.amount, decimals)?,
            recipient: account.account_id().clone(),
        })
        .await?;

    print_json(&json!({
        "recipient": account.address(),
        "receipt": receipt,
    }))
}

async fn stake(
    config: &AppConfig,
    secrets: &Secrets,
    amount: &str,
    validators: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let planck = to_planck(parse_amount(amount, config.polkadot.token_decimals)?)?;
    let client = connect_polkadot(config).await?;
    let account = load_account(secrets)?;

    let configured = if validators.is_empty() {
        config.flow.validators.clone()
    } else {
        validators
    };
    let targets = if configured.is_empty() {
        client
            .active_validators(config.flow.max_validators.clamp(1, MAX_NOMINATIONS))
            .await?
    } else {
        configured
            .iter()
            .map(|v| AccountId32::from_str(v).map_err(|_| format!("'{}' is not a valid SS58 address", v)))
            .collect::<Result<Vec<_>, _>>()?
    };

    let receipt = client.bond_and_nominate(&account, planck, &targets).await?;
    print_json(&receipt)
}

async fn run(config: &AppConfig, secrets: &Secrets) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let signals = spawn_signal_handler(shutdown.clone());

    let result = run_from_config(config, secrets, &shutdown, StatusReporter::new()).await;
    signals.abort();

    match result {
        Ok(report) => print_json(&report),
        Err(e) => {
            if let Some(hash) = e.bridge_tx() {
                print_json(&json!({ "error": e.to_string(), "bridge_tx": hash }))?;
            }
            Err(e.into())
        }
    }
}
