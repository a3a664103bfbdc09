use batch_swap_types::{TransactionRecord, TxHash, TxKey, TxStatus};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

/// Session-wide transaction collection, newest first.
///
/// At most one pending record exists per (input, output) token pair: inserting
/// a pending record evicts any earlier pending record for the same pair.
/// Every change is published to subscribers as a full snapshot.
#[derive(Clone)]
pub struct TransactionStore {
    records: Arc<RwLock<Vec<TransactionRecord>>>,
    updates: Arc<watch::Sender<Vec<TransactionRecord>>>,
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            updates: Arc::new(updates),
        }
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<TransactionRecord>> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> Vec<TransactionRecord> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, key: &TxKey) -> Option<TransactionRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| &r.key == key)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Pending records that already carry a ledger hash
    pub async fn pending_count(&self) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.awaits_confirmation())
            .count()
    }

    /// Hashes of every pending record known to the ledger, newest first
    pub async fn awaiting_confirmation(&self) -> Vec<TxHash> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.awaits_confirmation())
            .filter_map(|r| r.key.hash().cloned())
            .collect()
    }

    /// Like [`awaiting_confirmation`](Self::awaiting_confirmation), running
    /// `on_empty` under the read lock when nothing qualifies. No insert can
    /// land between the check and the callback.
    pub(crate) async fn awaiting_confirmation_or(&self, on_empty: impl FnOnce()) -> Vec<TxHash> {
        let records = self.records.read().await;
        let pending: Vec<TxHash> = records
            .iter()
            .filter(|r| r.awaits_confirmation())
            .filter_map(|r| r.key.hash().cloned())
            .collect();
        if pending.is_empty() {
            on_empty();
        }
        pending
    }

    /// Insert at the head, evicting pending records for the same pair.
    /// Returns the number of evicted records.
    pub async fn insert(&self, record: TransactionRecord) -> usize {
        let mut records = self.records.write().await;
        let evicted = insert_head(&mut records, record);
        self.publish(&records);
        evicted
    }

    /// Replace the record stored under `from` with the same record keyed by `to`.
    ///
    /// Returns `None` when no record is stored under `from`.
    pub async fn rekey(&self, from: &TxKey, to: TxKey) -> Option<TransactionRecord> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|r| &r.key == from)?;

        let mut record = records.remove(index);
        record.key = to;
        insert_head(&mut records, record.clone());
        self.publish(&records);
        Some(record)
    }

    /// Set status and, when given, gas. Returns `false` for an unknown key.
    pub async fn update(&self, key: &TxKey, status: TxStatus, gas_used: Option<String>) -> bool {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| &r.key == key) else {
            return false;
        };

        record.status = status;
        if gas_used.is_some() {
            record.gas_used = gas_used;
        }
        self.publish(&records);
        true
    }

    pub async fn remove(&self, key: &TxKey) -> Option<TransactionRecord> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|r| &r.key == key)?;
        let removed = records.remove(index);
        self.publish(&records);
        Some(removed)
    }

    fn publish(&self, records: &[TransactionRecord]) {
        self.updates.send_replace(records.to_vec());
    }
}

fn insert_head(records: &mut Vec<TransactionRecord>, record: TransactionRecord) -> usize {
    let before = records.len();
    if record.is_pending() {
        let pair = record.pair();
        records.retain(|r| !(r.is_pending() && r.pair() == pair));
    }
    let evicted = before - records.len();
    if evicted > 0 {
        debug!(key = %record.key, evicted, "Superseded pending transactions");
    }

    records.insert(0, record);
    evicted
}
