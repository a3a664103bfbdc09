use batch_swap_types::{FinalStatus, TransactionOutcome, TxHash, TxKey, TxStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{StatusReader, TransactionStore};

/// Result of polling a transaction until it resolves or the deadline passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Success { gas_used: Option<String> },
    Failed { gas_used: Option<String> },
    Timeout,
}

impl PollOutcome {
    /// Terminal status, or `None` on timeout
    pub fn status(&self) -> Option<TxStatus> {
        match self {
            PollOutcome::Success { .. } => Some(TxStatus::Success),
            PollOutcome::Failed { .. } => Some(TxStatus::Failed),
            PollOutcome::Timeout => None,
        }
    }

    pub fn gas_used(&self) -> Option<String> {
        match self {
            PollOutcome::Success { gas_used } | PollOutcome::Failed { gas_used } => {
                gas_used.clone()
            }
            PollOutcome::Timeout => None,
        }
    }
}

impl From<TransactionOutcome> for PollOutcome {
    fn from(outcome: TransactionOutcome) -> Self {
        match outcome.status {
            FinalStatus::Success => PollOutcome::Success {
                gas_used: outcome.gas_used,
            },
            FinalStatus::Failed => PollOutcome::Failed {
                gas_used: outcome.gas_used,
            },
        }
    }
}

/// Query `hash` every `interval` until the ledger reports a final status.
///
/// Query errors mean "not indexed yet". Returns [`PollOutcome::Timeout`] once
/// `timeout` has elapsed.
pub async fn poll_status(
    reader: &dyn StatusReader,
    hash: &TxHash,
    interval: Duration,
    timeout: Duration,
) -> PollOutcome {
    let polling = async {
        loop {
            match reader.get_status(hash).await {
                Ok(outcome) => return PollOutcome::from(outcome),
                Err(e) => debug!(hash = %hash, error = %e, "Transaction still pending"),
            }
            sleep(interval).await;
        }
    };

    match tokio::time::timeout(timeout, polling).await {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(hash = %hash, timeout_ms = timeout.as_millis() as u64, "Polling timed out");
            PollOutcome::Timeout
        }
    }
}

/// Timing of a sweep cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    /// Pause between cycles
    pub sweep_delay: Duration,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            poll_timeout: Duration::from_secs(60),
            sweep_delay: Duration::from_secs(5),
        }
    }
}

/// Running background sweep
pub struct SweepHandle {
    stop_tx: watch::Sender<bool>,
    // Cleared by the task in the same critical section that finds the store idle
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Spawn a sweep over `store`.
    ///
    /// Each cycle polls every pending record that carries a ledger hash and
    /// writes back terminal outcomes. The task ends by itself once no such
    /// record remains.
    pub fn spawn(
        store: TransactionStore,
        reader: Arc<dyn StatusReader>,
        settings: SweepSettings,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(run_sweep(
            store,
            reader,
            settings,
            stop_rx,
            running.clone(),
        ));
        Self {
            stop_tx,
            running,
            task,
        }
    }

    /// `false` as soon as the sweep has decided to exit, even if the task
    /// has not returned yet
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    /// Signal the sweep to stop and wait for it to exit
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run_sweep(
    store: TransactionStore,
    reader: Arc<dyn StatusReader>,
    settings: SweepSettings,
    mut stop_rx: watch::Receiver<bool>,
    running: Arc<AtomicBool>,
) {
    info!("Transaction sweep started");

    loop {
        if *stop_rx.borrow() {
            break;
        }

        let pending = store
            .awaiting_confirmation_or(|| running.store(false, Ordering::SeqCst))
            .await;
        if pending.is_empty() {
            break;
        }
        debug!(pending = pending.len(), "Sweeping pending transactions");

        for hash in pending {
            let outcome = tokio::select! {
                outcome = poll_status(
                    reader.as_ref(),
                    &hash,
                    settings.poll_interval,
                    settings.poll_timeout,
                ) => outcome,
                _ = stop_rx.changed() => {
                    info!("Transaction sweep stopped");
                    return;
                }
            };

            if let Some(status) = outcome.status() {
                store
                    .update(&TxKey::Hash(hash.clone()), status, outcome.gas_used())
                    .await;
                info!(hash = %hash, status = %status, "Sweep resolved transaction");
            }
        }

        tokio::select! {
            _ = sleep(settings.sweep_delay) => {}
            _ = stop_rx.changed() => {
                info!("Transaction sweep stopped");
                return;
            }
        }
    }

    info!("Transaction sweep finished");
}
