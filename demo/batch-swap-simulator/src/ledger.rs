//! Simulated ledger
//!
//! Holds pools, balances and transactions in memory so a whole batch can run
//! without a chain. Every call waits a random latency, submissions fail at a
//! configurable rate, and transactions only become visible after a few status
//! queries.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use batch_swap::{BalanceReader, SessionError};
use batch_swap_orchestrator::{SubmitError, SwapSubmitter};
use batch_swap_quote::{compute_quote, PoolReader, QuoteError};
use batch_swap_tracker::{LedgerError, StatusReader};
use batch_swap_types::{
    parse_amount_to_atomic, PoolReserves, SwapSubmission, Token, TokenPair, TransactionOutcome,
    TxHash,
};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Behaviour knobs for the simulated ledger
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    /// Simulated latency range (ms)
    pub latency_range: (u64, u64),
    /// Share of submissions accepted (0.0 to 1.0)
    pub success_rate: f64,
    /// Share of accepted swaps that fail on chain (0.0 to 1.0)
    pub revert_rate: f64,
    /// Status queries answered "not found" before a transaction is indexed
    pub index_delay: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            latency_range: (50, 150),
            success_rate: 0.95,
            revert_rate: 0.05,
            index_delay: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct SimulatedTx {
    outcome: TransactionOutcome,
    misses_left: u32,
}

/// In-memory exchange and ledger for one account
pub struct SimulatedLedger {
    settings: SimulationSettings,
    /// Pools keyed in stored order
    pools: RwLock<HashMap<TokenPair, PoolReserves>>,
    tokens: RwLock<Vec<Token>>,
    transactions: RwLock<HashMap<TxHash, SimulatedTx>>,
}

impl SimulatedLedger {
    pub fn new(settings: SimulationSettings, tokens: Vec<Token>) -> Self {
        Self {
            settings,
            pools: RwLock::new(HashMap::new()),
            tokens: RwLock::new(tokens),
            transactions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a pool stored as `(token_a, token_b)`
    pub async fn add_pool(&self, token_a: &str, token_b: &str, reserve_a: u128, reserve_b: u128) {
        self.pools.write().await.insert(
            TokenPair::new(token_a, token_b),
            PoolReserves::new(reserve_a, reserve_b),
        );
    }

    /// Simulate network latency
    async fn simulate_latency(&self) {
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.settings.latency_range.0..=self.settings.latency_range.1)
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    /// Roll against a rate between 0.0 and 1.0
    fn roll(rate: f64) -> bool {
        let mut rng = rand::thread_rng();
        rng.gen::<f64>() < rate
    }

    /// Move `amount` of input into the pool and pay the output to the account
    async fn execute(&self, swap: &SwapSubmission) -> Result<Decimal, SubmitError> {
        let amount = Decimal::from_str(&swap.amount)
            .map_err(|e| SubmitError::Rejected(format!("bad amount: {e}")))?;

        let mut pools = self.pools.write().await;
        let stored = swap.pool_order();
        let reserves = pools
            .get_mut(&stored)
            .ok_or_else(|| SubmitError::Rejected("no pool for pair".to_string()))?;

        let oriented = if swap.reversed {
            reserves.flipped()
        } else {
            *reserves
        };
        let quote = compute_quote(oriented.input_reserve, oriented.output_reserve, amount)
            .map_err(|e| SubmitError::Rejected(e.to_string()))?;

        let mut tokens = self.tokens.write().await;
        let input_decimals = decimals_of(&tokens, &swap.input)?;
        let output_decimals = decimals_of(&tokens, &swap.output)?;

        let spent = atomic(&swap.amount, input_decimals);
        let received = atomic(&quote.output_amount.to_string(), output_decimals);
        let balance = balance_of(&tokens, &swap.input);
        if balance < spent {
            return Err(SubmitError::InsufficientBalance(format!(
                "have {balance}, need {spent}"
            )));
        }

        adjust_balance(&mut tokens, &swap.input, -spent);
        adjust_balance(&mut tokens, &swap.output, received);

        let amount_in = amount.ceil().to_u128().unwrap_or(0);
        let amount_out = quote.output_amount.floor().to_u128().unwrap_or(0);
        let updated = PoolReserves::new(
            oriented.input_reserve.saturating_add(amount_in),
            oriented.output_reserve.saturating_sub(amount_out),
        );
        *reserves = if swap.reversed {
            updated.flipped()
        } else {
            updated
        };

        Ok(quote.output_amount)
    }
}

fn decimals_of(tokens: &[Token], address: &str) -> Result<u8, SubmitError> {
    tokens
        .iter()
        .find(|t| t.address == address)
        .map(|t| t.decimals)
        .ok_or_else(|| SubmitError::Rejected(format!("unknown token {address}")))
}

fn atomic(amount: &str, decimals: u8) -> Decimal {
    Decimal::from_str(&parse_amount_to_atomic(amount, decimals)).unwrap_or(Decimal::ZERO)
}

fn balance_of(tokens: &[Token], address: &str) -> Decimal {
    tokens
        .iter()
        .find(|t| t.address == address)
        .and_then(|t| Decimal::from_str(&t.balance).ok())
        .unwrap_or(Decimal::ZERO)
}

fn adjust_balance(tokens: &mut [Token], address: &str, delta: Decimal) {
    if let Some(token) = tokens.iter_mut().find(|t| t.address == address) {
        let current = Decimal::from_str(&token.balance).unwrap_or(Decimal::ZERO);
        token.balance = (current + delta).max(Decimal::ZERO).normalize().to_string();
    }
}

#[async_trait]
impl PoolReader for SimulatedLedger {
    async fn get_reserves(
        &self,
        token_a: &str,
        token_b: &str,
    ) -> Result<Option<PoolReserves>, QuoteError> {
        self.simulate_latency().await;
        let pools = self.pools.read().await;
        Ok(pools.get(&TokenPair::new(token_a, token_b)).copied())
    }
}

#[async_trait]
impl SwapSubmitter for SimulatedLedger {
    async fn submit(&self, swap: &SwapSubmission) -> Result<TxHash, SubmitError> {
        self.simulate_latency().await;

        if !Self::roll(self.settings.success_rate) {
            return Err(SubmitError::Network("simulated broadcast failure".to_string()));
        }

        let hash = TxHash::new(format!("0x{}", Uuid::new_v4().simple()));
        let outcome = if Self::roll(self.settings.revert_rate) {
            TransactionOutcome::failed().with_gas_used("38")
        } else {
            let output = self.execute(swap).await?;
            debug!(hash = %hash, input = %swap.input, output = %output, "Simulated swap executed");
            TransactionOutcome::success().with_gas_used("1204")
        };

        self.transactions.write().await.insert(
            hash.clone(),
            SimulatedTx {
                outcome,
                misses_left: self.settings.index_delay,
            },
        );

        info!(hash = %hash, input = %swap.input, amount = %swap.amount, "Swap broadcast");
        Ok(hash)
    }
}

#[async_trait]
impl StatusReader for SimulatedLedger {
    async fn get_status(&self, hash: &TxHash) -> Result<TransactionOutcome, LedgerError> {
        self.simulate_latency().await;

        let mut transactions = self.transactions.write().await;
        let tx = transactions
            .get_mut(hash)
            .ok_or_else(|| LedgerError::NotFound(hash.clone()))?;

        if tx.misses_left > 0 {
            tx.misses_left -= 1;
            return Err(LedgerError::NotFound(hash.clone()));
        }
        Ok(tx.outcome.clone())
    }
}

#[async_trait]
impl BalanceReader for SimulatedLedger {
    async fn get_balances(&self, _account: &str) -> Result<Vec<Token>, SessionError> {
        self.simulate_latency().await;
        Ok(self.tokens.read().await.clone())
    }
}
