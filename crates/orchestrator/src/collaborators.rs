use async_trait::async_trait;
use batch_swap_types::{SwapSubmission, TxHash};
use thiserror::Error;

/// Signs and broadcasts a swap on behalf of the connected account
#[async_trait]
pub trait SwapSubmitter: Send + Sync {
    /// Submit the swap and return the ledger hash
    async fn submit(&self, swap: &SwapSubmission) -> Result<TxHash, SubmitError>;
}

/// Reloads account balances once a batch is over
#[async_trait]
pub trait BalanceRefresher: Send + Sync {
    async fn refresh(&self, account: &str) -> Result<(), RefreshError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("user rejected the transaction")]
    UserRejected,

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("balance refresh failed: {0}")]
    Failed(String),
}
