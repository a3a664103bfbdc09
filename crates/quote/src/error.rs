use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid output amount: {output}")]
    InvalidOutput { output: Decimal },

    #[error("pool query failed: {0}")]
    PoolQuery(String),
}
