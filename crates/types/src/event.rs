use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::TxHash;

/// User-visible outcome signals emitted while a batch runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwapEvent {
    /// Swap accepted by the ledger, awaiting confirmation
    Submitted { symbol: String, hash: TxHash },

    /// Ledger confirmed the swap
    Succeeded {
        symbol: String,
        target_symbol: String,
        hash: TxHash,
    },

    /// Swap did not complete; `kind` says at which stage
    Failed {
        symbol: String,
        kind: FailureKind,
        reason: String,
    },

    /// Advisory price impact above the configured maximum; never submitted
    Skipped {
        symbol: String,
        price_impact: Decimal,
        max_price_impact: Decimal,
    },

    /// Batch finished
    BatchCompleted { succeeded: u32, failed: u32 },
}

/// Stage at which a swap failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Submitter refused or could not broadcast the swap
    Rejected,
    /// Ledger never reported a final status in time
    Timeout,
    /// Ledger executed the swap and reported failure
    Reverted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Rejected => "rejected",
            FailureKind::Timeout => "timeout",
            FailureKind::Reverted => "reverted",
        }
    }
}

impl SwapEvent {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            SwapEvent::Submitted { symbol, .. }
            | SwapEvent::Succeeded { symbol, .. }
            | SwapEvent::Failed { symbol, .. }
            | SwapEvent::Skipped { symbol, .. } => Some(symbol),
            SwapEvent::BatchCompleted { .. } => None,
        }
    }
}

/// Sink for swap events (toasts, metrics, logs)
pub trait SwapNotifier: Send + Sync {
    fn notify(&self, event: &SwapEvent);
}

/// Notifier that writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl SwapNotifier for LogNotifier {
    fn notify(&self, event: &SwapEvent) {
        match event {
            SwapEvent::Submitted { symbol, hash } => {
                info!(symbol = %symbol, hash = %hash, "Swapping");
            }
            SwapEvent::Succeeded {
                symbol,
                target_symbol,
                hash,
            } => {
                info!(symbol = %symbol, target = %target_symbol, hash = %hash, "Swap successful");
            }
            SwapEvent::Failed {
                symbol,
                kind,
                reason,
            } => {
                error!(symbol = %symbol, kind = kind.as_str(), reason = %reason, "Swap failed");
            }
            SwapEvent::Skipped {
                symbol,
                price_impact,
                max_price_impact,
            } => {
                warn!(
                    symbol = %symbol,
                    price_impact = %price_impact.round_dp(2),
                    max_price_impact = %max_price_impact,
                    "Skipping swap, price impact too high"
                );
            }
            SwapEvent::BatchCompleted { succeeded, failed } => {
                if *succeeded > 0 {
                    info!(succeeded, failed, "Batch swap completed");
                } else if *failed > 0 {
                    error!(failed, "Batch swap failed");
                }
            }
        }
    }
}
