use batch_swap_retry::{retry_with_backoff, RetryPolicy};
use batch_swap_types::{
    PlaceholderId, TokenAmount, TransactionOutcome, TransactionRecord, TxHash, TxKey, TxStatus,
    PLACEHOLDER_PREFIX,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    poll_status, PollOutcome, StatusReader, SweepHandle, SweepSettings, TrackerError,
    TransactionStore,
};

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.aptoslabs.com/txn/{hash}?network=testnet";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Retry schedule used by [`TransactionTracker::confirm`]
    pub confirmation: RetryPolicy,
    pub sweep: SweepSettings,
    /// Explorer link template; `{hash}` is replaced by the transaction hash
    pub explorer_url: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            confirmation: RetryPolicy::default(),
            sweep: SweepSettings::default(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

/// Owns the lifecycle of every swap transaction in the session
pub struct TransactionTracker {
    store: TransactionStore,
    reader: Arc<dyn StatusReader>,
    config: TrackerConfig,
    sequence: AtomicU64,
    sweep: Mutex<Option<SweepHandle>>,
}

impl TransactionTracker {
    pub fn new(reader: Arc<dyn StatusReader>) -> Self {
        Self::with_config(reader, TrackerConfig::default())
    }

    pub fn with_config(reader: Arc<dyn StatusReader>, config: TrackerConfig) -> Self {
        Self {
            store: TransactionStore::new(),
            reader,
            config,
            sequence: AtomicU64::new(0),
            sweep: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.store.snapshot().await
    }

    /// Pending transactions the ledger already knows about
    pub async fn pending_count(&self) -> usize {
        self.store.pending_count().await
    }

    /// Record a swap before submission under a fresh placeholder
    pub async fn create_pending(&self, input: TokenAmount, output: TokenAmount) -> PlaceholderId {
        let placeholder = self.next_placeholder();
        let record = TransactionRecord::pending(
            TxKey::Placeholder(placeholder.clone()),
            input,
            output,
            chrono::Utc::now().timestamp_millis(),
        );

        self.store.insert(record).await;
        debug!(placeholder = %placeholder, "Created pending transaction");
        placeholder
    }

    /// Move the record stored under `placeholder` to its ledger hash
    pub async fn promote(
        &self,
        placeholder: &PlaceholderId,
        hash: TxHash,
    ) -> Result<TransactionRecord, TrackerError> {
        let from = TxKey::Placeholder(placeholder.clone());
        let record = self
            .store
            .rekey(&from, TxKey::Hash(hash.clone()))
            .await
            .ok_or_else(|| TrackerError::UnknownPlaceholder(placeholder.clone()))?;

        debug!(placeholder = %placeholder, hash = %hash, "Promoted transaction");
        Ok(record)
    }

    /// Wait for the ledger to report a final status, retrying with backoff.
    ///
    /// Does not touch the stored record.
    pub async fn confirm(&self, hash: &TxHash) -> Result<TransactionOutcome, TrackerError> {
        let reader = self.reader.as_ref();

        retry_with_backoff(&self.config.confirmation, |attempt| {
            debug!(hash = %hash, attempt, "Checking transaction status");
            reader.get_status(hash)
        })
        .await
        .map_err(|e| {
            warn!(hash = %hash, attempts = e.attempts(), error = %e, "Confirmation timed out");
            TrackerError::ConfirmationTimeout {
                hash: hash.clone(),
                attempts: e.attempts(),
                last_error: e.last_failure().to_string(),
            }
        })
    }

    pub async fn poll_until_resolved(
        &self,
        hash: &TxHash,
        interval: Duration,
        timeout: Duration,
    ) -> PollOutcome {
        poll_status(self.reader.as_ref(), hash, interval, timeout).await
    }

    /// Poll in a background task; abort the handle to cancel
    pub fn spawn_poll(
        &self,
        hash: TxHash,
        interval: Duration,
        timeout: Duration,
    ) -> JoinHandle<PollOutcome> {
        let reader = self.reader.clone();
        tokio::spawn(async move { poll_status(reader.as_ref(), &hash, interval, timeout).await })
    }

    /// Update a record in place. Unknown keys are ignored; `None` gas keeps
    /// the stored value.
    pub async fn mutate(&self, key: &TxKey, status: TxStatus, gas_used: Option<String>) -> bool {
        let updated = self.store.update(key, status, gas_used).await;
        if !updated {
            debug!(key = %key, "Ignoring update for unknown transaction");
        }
        updated
    }

    pub async fn remove(&self, key: &TxKey) -> Option<TransactionRecord> {
        self.store.remove(key).await
    }

    /// Track a transaction submitted elsewhere and make sure the sweep runs
    pub async fn track_submitted(&self, hash: TxHash, input: TokenAmount, output: TokenAmount) {
        let record = TransactionRecord::pending(
            TxKey::Hash(hash.clone()),
            input,
            output,
            chrono::Utc::now().timestamp_millis(),
        );
        self.store.insert(record).await;
        info!(hash = %hash, "Tracking submitted transaction");

        self.start_sweep().await;
    }

    /// Start the background sweep unless one is already running.
    ///
    /// Returns `true` when a new sweep was spawned.
    pub async fn start_sweep(&self) -> bool {
        let mut sweep = self.sweep.lock().await;
        if sweep.as_ref().is_some_and(SweepHandle::is_running) {
            return false;
        }

        *sweep = Some(SweepHandle::spawn(
            self.store.clone(),
            self.reader.clone(),
            self.config.sweep,
        ));
        true
    }

    pub async fn stop_sweep(&self) {
        if let Some(handle) = self.sweep.lock().await.take() {
            handle.stop().await;
        }
    }

    pub async fn is_sweeping(&self) -> bool {
        self.sweep
            .lock()
            .await
            .as_ref()
            .is_some_and(SweepHandle::is_running)
    }

    pub fn explorer_url(&self, hash: &TxHash) -> String {
        self.config.explorer_url.replace("{hash}", hash.as_str())
    }

    fn next_placeholder(&self) -> PlaceholderId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let suffix = Uuid::new_v4().simple().to_string();
        PlaceholderId::new(format!(
            "{PLACEHOLDER_PREFIX}{}_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sequence,
            &suffix[..9]
        ))
    }
}
