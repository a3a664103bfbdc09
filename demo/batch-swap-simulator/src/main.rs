//! Batch Swap Simulator - Main entry point
//!
//! Connects a session to an in-memory ledger, selects a share of every token
//! balance, and swaps all of it into the target token in one batch.

mod ledger;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use batch_swap::SwapSession;
use batch_swap_config::{validate_config, AppConfig, ConfigLoader, ENV_PREFIX};
use batch_swap_metrics::{init_tracing, MetricsCollector, MetricsNotifier};
use batch_swap_orchestrator::SwapOutcome;
use batch_swap_types::{
    format_address, format_amount, LogNotifier, SwapEvent, SwapNotifier, Token, TxKey,
};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::ledger::{SimulatedLedger, SimulationSettings};

const ACCOUNT: &str = "0x7c1e5a0d9b3f2e8a4c6d1b0f3e9a2c5d7b4e1f0a3c6d9e2b5a8f1c4d7e0b3a6f";

/// Batch Swap Simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (TOML, YAML or JSON); BATCH_SWAP_* variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Percentage of each balance to swap
    #[arg(long, default_value = "10")]
    percent: u32,

    /// Abort the batch after the first failure
    #[arg(long)]
    stop_on_error: bool,

    /// Quote refresh rounds to run before the batch
    #[arg(long, default_value = "0")]
    quote_rounds: u32,

    /// Mock latency in milliseconds
    #[arg(long, default_value = "100")]
    mock_latency: u64,

    /// Share of submissions the ledger accepts
    #[arg(long, default_value = "0.95")]
    success_rate: f64,

    /// Share of accepted swaps that fail on chain
    #[arg(long, default_value = "0.05")]
    revert_rate: f64,

    /// Print the Prometheus metrics after the batch
    #[arg(long)]
    metrics: bool,
}

/// Sends every event to the log and to the metrics
struct DemoNotifier {
    log: LogNotifier,
    metrics: MetricsNotifier,
}

impl SwapNotifier for DemoNotifier {
    fn notify(&self, event: &SwapEvent) {
        self.log.notify(event);
        self.metrics.notify(event);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args)?;
    if args.stop_on_error {
        config.batch.stop_on_error = true;
    }
    validate_config(&config).context("invalid configuration")?;

    init_tracing(&config.network.log_level, config.network.log_json)
        .context("failed to initialise tracing")?;

    info!("Starting Batch Swap Simulator");
    info!("  Environment: {:?}", config.network.environment);
    info!("  Target: {}", config.dex.target_token);

    let target = config.dex.target_token.clone();
    let ledger = Arc::new(SimulatedLedger::new(
        SimulationSettings {
            latency_range: (args.mock_latency / 2, args.mock_latency),
            success_rate: args.success_rate,
            revert_rate: args.revert_rate,
            ..Default::default()
        },
        wallet(&target),
    ));
    seed_pools(&ledger, &target).await;

    let collector = Arc::new(MetricsCollector::new());
    let notifier = Arc::new(DemoNotifier {
        log: LogNotifier,
        metrics: MetricsNotifier::new(collector.clone()),
    });

    let mut session = SwapSession::builder()
        .with_config(config.clone())
        .with_pool_reader(ledger.clone())
        .with_submitter(ledger.clone())
        .with_status_reader(ledger.clone())
        .with_balance_reader(ledger.clone())
        .with_notifier(notifier)
        .build()
        .context("failed to build session")?;

    session
        .connect(ACCOUNT)
        .await
        .context("failed to connect account")?;
    info!("Connected {}", format_address(ACCOUNT));

    select_share(&session, &target, args.percent).await?;

    for round in 0..args.quote_rounds {
        tokio::time::sleep(config.quotes.refresh_interval()).await;
        let changed = session.refresh_quotes().await;
        info!(round, changed, "Quote refresh");
    }

    let preview = session.preview().await;
    info!(
        swaps = preview.swap_count,
        expected = %preview.total_expected_output,
        max_price_impact = %preview.max_price_impact.round_dp(2),
        "Batch preview"
    );
    if preview.has_high_price_impact {
        warn!("Some swaps exceed the price impact limit and will be skipped");
    }

    let summary = session.run_batch().await.context("batch rejected")?;

    println!();
    println!(
        "Batch finished: {} succeeded, {} failed, {} skipped",
        summary.succeeded,
        summary.failed,
        summary.skipped.len()
    );
    if summary.stopped_early {
        println!("Stopped early after a failure");
    }
    for outcome in &summary.outcomes {
        match outcome {
            SwapOutcome::Succeeded { symbol, hash, .. } => {
                println!("  ok    {symbol:<6} {}", session.explorer_url(hash));
            }
            SwapOutcome::Reverted { symbol, hash } => {
                println!("  fail  {symbol:<6} {}", session.explorer_url(hash));
            }
            SwapOutcome::Errored { error, .. } => {
                println!("  error {error}");
            }
        }
    }

    println!();
    println!("Transactions:");
    for tx in session.transactions().await {
        let key = match &tx.key {
            TxKey::Hash(hash) => format_address(hash.as_str()),
            TxKey::Placeholder(id) => id.to_string(),
        };
        println!(
            "  {:<8} {} {} -> {} {}",
            tx.status, tx.input.amount, tx.input.symbol, tx.output.symbol, key
        );
    }

    println!();
    println!("Balances:");
    for token in session.tokens().await {
        println!(
            "  {:<6} {}",
            token.symbol,
            format_amount(&token.balance, token.decimals)
        );
    }

    if args.metrics {
        println!();
        print!("{}", collector.export_metrics()?);
    }

    session.disconnect().await;
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    match &args.config {
        Some(path) => ConfigLoader::from_file_with_env(path, ENV_PREFIX)
            .with_context(|| format!("failed to load {}", path.display())),
        None => ConfigLoader::from_env().context("failed to read environment"),
    }
}

fn wallet(target: &str) -> Vec<Token> {
    vec![
        Token::new(target, "APT", 8)
            .with_name("Aptos Coin")
            .with_balance("1250000000"),
        Token::new("0x1::usdc::USDC", "USDC", 6)
            .with_name("USD Coin")
            .with_balance("842500000"),
        Token::new("0x1::weth::WETH", "WETH", 8)
            .with_name("Wrapped Ether")
            .with_balance("75000000"),
        Token::new("0x1::cake::CAKE", "CAKE", 8)
            .with_name("PancakeSwap Token")
            .with_balance("3200000000"),
        Token::new("0x1::meme::MEME", "MEME", 6)
            .with_name("Thin Pool Token")
            .with_balance("90000000000"),
    ]
}

async fn seed_pools(ledger: &SimulatedLedger, target: &str) {
    ledger
        .add_pool("0x1::usdc::USDC", target, 4_000_000, 500_000)
        .await;
    // stored with the target first
    ledger
        .add_pool(target, "0x1::weth::WETH", 2_600_000, 10_000)
        .await;
    ledger
        .add_pool("0x1::cake::CAKE", target, 900_000, 250_000)
        .await;
    // shallow enough that any real swap moves the price
    ledger
        .add_pool("0x1::meme::MEME", target, 5_000, 40)
        .await;
}

/// Select `percent` of every non-target balance and quote it
async fn select_share(session: &SwapSession, target: &str, percent: u32) -> anyhow::Result<()> {
    let share = Decimal::from(percent) / Decimal::ONE_HUNDRED;

    for token in session.tokens().await {
        if token.address == target {
            continue;
        }

        let balance = Decimal::from_str(&token.balance)
            .with_context(|| format!("bad balance for {}", token.symbol))?;
        let units = Decimal::from_i128_with_scale(1, token.decimals as u32);
        let amount = (balance * units * share)
            .round_dp(token.decimals as u32)
            .normalize();

        session.select(&token.address, true).await?;
        match session.set_amount(&token.address, &amount.to_string()).await? {
            Some(quote) => info!(
                symbol = %token.symbol,
                amount = %amount,
                expected = %quote.quote.output_amount,
                price_impact = %quote.quote.price_impact.round_dp(2),
                "Selected"
            ),
            None => warn!(symbol = %token.symbol, amount = %amount, "No quote, not selected"),
        }
    }

    Ok(())
}
