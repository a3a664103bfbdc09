use batch_swap_types::{PlaceholderId, TxHash};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("unknown placeholder: {0}")]
    UnknownPlaceholder(PlaceholderId),

    #[error("confirmation of {hash} timed out after {attempts} attempts: {last_error}")]
    ConfirmationTimeout {
        hash: TxHash,
        attempts: u32,
        last_error: String,
    },
}

/// Errors from the ledger read API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transaction not found: {0}")]
    NotFound(TxHash),

    #[error("ledger query failed: {0}")]
    Query(String),
}
