use batch_swap_types::{FailureKind, TxHash, TxKey};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a single swap did not reach the ledger or could not be confirmed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("{symbol}: submission rejected: {reason}")]
    SubmissionRejected { symbol: String, reason: String },

    #[error("{symbol}: confirmation of {hash} timed out: {reason}")]
    ConfirmationTimeout {
        symbol: String,
        hash: TxHash,
        reason: String,
    },
}

impl SwapError {
    pub fn symbol(&self) -> &str {
        match self {
            SwapError::SubmissionRejected { symbol, .. }
            | SwapError::ConfirmationTimeout { symbol, .. } => symbol,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SwapError::SubmissionRejected { .. } => FailureKind::Rejected,
            SwapError::ConfirmationTimeout { .. } => FailureKind::Timeout,
        }
    }
}

/// Terminal result of one attempted swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Ledger confirmed the swap
    Succeeded {
        symbol: String,
        hash: TxHash,
        gas_used: Option<String>,
    },

    /// Ledger executed the transaction but reported failure
    Reverted { symbol: String, hash: TxHash },

    /// Swap was rejected or its outcome is unknown
    Errored { key: TxKey, error: SwapError },
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwapOutcome::Succeeded { .. })
    }

    pub fn symbol(&self) -> &str {
        match self {
            SwapOutcome::Succeeded { symbol, .. } | SwapOutcome::Reverted { symbol, .. } => symbol,
            SwapOutcome::Errored { error, .. } => error.symbol(),
        }
    }
}

/// Request passed over because its advisory price impact was too high
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSwap {
    pub symbol: String,
    pub address: String,
    pub price_impact: Decimal,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: Vec<SkippedSwap>,
    /// One entry per attempted swap, in request order
    pub outcomes: Vec<SwapOutcome>,
    /// Batch stopped after a failure
    pub stopped_early: bool,
}

impl BatchSummary {
    pub fn attempted(&self) -> u32 {
        self.succeeded + self.failed
    }

    pub(crate) fn record(&mut self, outcome: SwapOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}
