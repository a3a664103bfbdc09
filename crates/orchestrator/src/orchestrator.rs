use batch_swap_quote::parse_amount;
use batch_swap_tracker::TransactionTracker;
use batch_swap_types::{
    FailureKind, FinalStatus, LogNotifier, SwapEvent, SwapNotifier, SwapRequest, SwapSubmission,
    Token, TxKey, TxStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collaborators::{BalanceRefresher, SwapSubmitter};
use crate::policy::BatchPolicy;
use crate::summary::{BatchSummary, SkippedSwap, SwapError, SwapOutcome};

/// Errors that reject a batch before any swap is attempted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid request for {symbol}: {reason}")]
    InvalidRequest { symbol: String, reason: String },
}

/// Builder error
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
}

/// Builder for BatchSwapOrchestrator
#[derive(Default)]
pub struct BatchSwapOrchestratorBuilder {
    tracker: Option<Arc<TransactionTracker>>,
    submitter: Option<Arc<dyn SwapSubmitter>>,
    refresher: Option<Arc<dyn BalanceRefresher>>,
    notifier: Option<Arc<dyn SwapNotifier>>,
}

impl BatchSwapOrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transaction tracker shared with the session
    pub fn with_tracker(mut self, tracker: Arc<TransactionTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Set the swap submitter
    pub fn with_submitter(mut self, submitter: Arc<dyn SwapSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Set the balance refresher invoked after each batch
    pub fn with_refresher(mut self, refresher: Arc<dyn BalanceRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Set the event sink; defaults to logging
    pub fn with_notifier(mut self, notifier: Arc<dyn SwapNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<BatchSwapOrchestrator, BuilderError> {
        let tracker = self.tracker.ok_or_else(|| BuilderError::MissingField {
            field: "tracker".to_string(),
        })?;

        let submitter = self.submitter.ok_or_else(|| BuilderError::MissingField {
            field: "submitter".to_string(),
        })?;

        let refresher = self.refresher.ok_or_else(|| BuilderError::MissingField {
            field: "refresher".to_string(),
        })?;

        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        Ok(BatchSwapOrchestrator {
            tracker,
            submitter,
            refresher,
            notifier,
        })
    }
}

/// Executes batches of swaps into a single target token, one at a time.
///
/// Swaps are strictly sequential: wallet prompts are serialized and each swap
/// changes the balances the next one sees.
pub struct BatchSwapOrchestrator {
    tracker: Arc<TransactionTracker>,
    submitter: Arc<dyn SwapSubmitter>,
    refresher: Arc<dyn BalanceRefresher>,
    notifier: Arc<dyn SwapNotifier>,
}

impl BatchSwapOrchestrator {
    pub fn builder() -> BatchSwapOrchestratorBuilder {
        BatchSwapOrchestratorBuilder::new()
    }

    pub fn tracker(&self) -> &Arc<TransactionTracker> {
        &self.tracker
    }

    /// Run `requests` in order, swapping each into `target`.
    ///
    /// Requests already denominated in the target are passed over silently.
    /// Requests whose advisory price impact exceeds the policy maximum are
    /// skipped without touching the ledger. Per-swap failures are recorded
    /// and counted; only a malformed request fails the whole batch, before
    /// anything is submitted.
    pub async fn run_batch(
        &self,
        requests: &[SwapRequest],
        target: &Token,
        policy: &BatchPolicy,
        account: &str,
    ) -> Result<BatchSummary, BatchError> {
        validate_requests(requests, target)?;

        info!(
            requests = requests.len(),
            target = %target.symbol,
            stop_on_error = policy.stop_on_error,
            "Starting batch swap"
        );

        let mut summary = BatchSummary::default();
        let last_index = requests.len().saturating_sub(1);

        for (index, request) in requests.iter().enumerate() {
            if request.input.address == target.address {
                debug!(symbol = %request.input.symbol, "Skipping swap into itself");
                continue;
            }

            if policy.exceeds_price_impact(request.price_impact) {
                let price_impact = request.price_impact.unwrap_or_default();
                self.notifier.notify(&SwapEvent::Skipped {
                    symbol: request.input.symbol.clone(),
                    price_impact,
                    max_price_impact: policy.max_price_impact,
                });
                summary.skipped.push(SkippedSwap {
                    symbol: request.input.symbol.clone(),
                    address: request.input.address.clone(),
                    price_impact,
                });
                continue;
            }

            let outcome = self.execute_swap(request, target).await;
            let failed = !outcome.is_success();
            summary.record(outcome);

            if failed && policy.stop_on_error {
                warn!(
                    symbol = %request.input.symbol,
                    remaining = last_index - index,
                    "Stopping batch after failure"
                );
                summary.stopped_early = true;
                break;
            }

            if index < last_index && !policy.delay_between_swaps.is_zero() {
                tokio::time::sleep(policy.delay_between_swaps).await;
            }
        }

        if summary.attempted() > 0 {
            if let Err(e) = self.refresher.refresh(account).await {
                warn!(account = %account, error = %e, "Balance refresh failed");
            }
        }

        self.notifier.notify(&SwapEvent::BatchCompleted {
            succeeded: summary.succeeded,
            failed: summary.failed,
        });

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped.len(),
            "Batch swap finished"
        );

        Ok(summary)
    }

    async fn execute_swap(&self, request: &SwapRequest, target: &Token) -> SwapOutcome {
        let symbol = request.input.symbol.clone();
        let expected_output = request
            .expected_output
            .map(|output| output.to_string())
            .unwrap_or_else(|| "0".to_string());

        let placeholder = self
            .tracker
            .create_pending(
                request.input.amount(&request.amount),
                target.amount(expected_output),
            )
            .await;
        let mut key = TxKey::Placeholder(placeholder.clone());

        let submission = SwapSubmission {
            output: target.address.clone(),
            ..request.submission()
        };

        info!(
            symbol = %symbol,
            target = %target.symbol,
            amount = %request.amount,
            "Executing swap"
        );

        let hash = match self.submitter.submit(&submission).await {
            Ok(hash) => hash,
            Err(e) => {
                let error = SwapError::SubmissionRejected {
                    symbol,
                    reason: e.to_string(),
                };
                return self.fail(key, error).await;
            }
        };

        match self.tracker.promote(&placeholder, hash.clone()).await {
            Ok(_) => key = TxKey::Hash(hash.clone()),
            Err(e) => warn!(hash = %hash, error = %e, "Could not promote pending transaction"),
        }

        self.notifier.notify(&SwapEvent::Submitted {
            symbol: symbol.clone(),
            hash: hash.clone(),
        });

        let outcome = match self.tracker.confirm(&hash).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let error = SwapError::ConfirmationTimeout {
                    symbol,
                    hash,
                    reason: e.to_string(),
                };
                return self.fail(key, error).await;
            }
        };

        self.tracker
            .mutate(&key, outcome.status.into(), outcome.gas_used.clone())
            .await;

        match outcome.status {
            FinalStatus::Success => {
                self.notifier.notify(&SwapEvent::Succeeded {
                    symbol: symbol.clone(),
                    target_symbol: target.symbol.clone(),
                    hash: hash.clone(),
                });
                SwapOutcome::Succeeded {
                    symbol,
                    hash,
                    gas_used: outcome.gas_used,
                }
            }
            FinalStatus::Failed => {
                self.notifier.notify(&SwapEvent::Failed {
                    symbol: symbol.clone(),
                    kind: FailureKind::Reverted,
                    reason: format!("transaction {hash} failed on chain"),
                });
                SwapOutcome::Reverted { symbol, hash }
            }
        }
    }

    /// Mark the record under `key` failed and report the error
    async fn fail(&self, key: TxKey, error: SwapError) -> SwapOutcome {
        self.tracker.mutate(&key, TxStatus::Failed, None).await;
        self.notifier.notify(&SwapEvent::Failed {
            symbol: error.symbol().to_string(),
            kind: error.kind(),
            reason: error.to_string(),
        });

        SwapOutcome::Errored { key, error }
    }
}

/// Check the amount of every request the loop could submit; requests already
/// in the target are passed over and never read.
fn validate_requests(requests: &[SwapRequest], target: &Token) -> Result<(), BatchError> {
    for request in requests
        .iter()
        .filter(|request| request.input.address != target.address)
    {
        parse_amount(&request.amount).map_err(|e| BatchError::InvalidRequest {
            symbol: request.input.symbol.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
