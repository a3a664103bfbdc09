use async_trait::async_trait;
use batch_swap_types::{TransactionOutcome, TxHash};

use crate::LedgerError;

/// Read access to committed transactions
#[async_trait]
pub trait StatusReader: Send + Sync {
    /// Final outcome of `hash`. Errors while the transaction is not yet indexed.
    async fn get_status(&self, hash: &TxHash) -> Result<TransactionOutcome, LedgerError>;
}
