use batch_swap_config::ConfigError;
use batch_swap_orchestrator::{BatchError, BuilderError};
use batch_swap_quote::QuoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no account connected")]
    NotConnected,

    #[error("target token {address} is not in the token list")]
    TargetTokenMissing { address: String },

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("a batch is already running")]
    BatchInProgress,

    #[error("balance query failed: {0}")]
    Balance(String),

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("session builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("batch rejected: {0}")]
    Batch(#[from] BatchError),
}
