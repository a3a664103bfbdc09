use async_trait::async_trait;
use batch_swap_types::{PoolReserves, TokenPair};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::QuoteError;

/// Read access to the exchange's pool reserves
#[async_trait]
pub trait PoolReader: Send + Sync {
    /// Reserves of the pool stored as `(token_a, token_b)`, or `None` if no
    /// pool exists in that order. `input_reserve` holds `token_a`.
    async fn get_reserves(
        &self,
        token_a: &str,
        token_b: &str,
    ) -> Result<Option<PoolReserves>, QuoteError>;
}

/// A pool resolved for a swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLookup {
    /// Reserves oriented as (input, output) for the swap
    pub reserves: PoolReserves,

    /// Pool is stored in (output, input) order
    pub reversed: bool,
}

/// Resolve the pool for `input -> output`, trying both storage orders.
///
/// When the pool is only found as `(output, input)` the reserves are flipped
/// so callers always see them in swap direction.
pub async fn find_pool(
    reader: &dyn PoolReader,
    input: &str,
    output: &str,
) -> Result<Option<PoolLookup>, QuoteError> {
    if let Some(reserves) = reader.get_reserves(input, output).await? {
        return Ok(Some(PoolLookup {
            reserves,
            reversed: false,
        }));
    }

    if let Some(reserves) = reader.get_reserves(output, input).await? {
        debug!(input = %input, output = %output, "Pool stored in reverse order");
        return Ok(Some(PoolLookup {
            reserves: reserves.flipped(),
            reversed: true,
        }));
    }

    Ok(None)
}

/// Pool reader backed by an in-memory table, for simulations and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryPoolReader {
    pools: Arc<RwLock<HashMap<TokenPair, PoolReserves>>>,
}

impl InMemoryPoolReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool stored as `(token_a, token_b)` while building the reader
    pub fn with_pool(
        self,
        token_a: impl Into<String>,
        token_b: impl Into<String>,
        reserve_a: u128,
        reserve_b: u128,
    ) -> Self {
        if let Ok(mut pools) = self.pools.try_write() {
            pools.insert(
                TokenPair::new(token_a, token_b),
                PoolReserves::new(reserve_a, reserve_b),
            );
        }
        self
    }

    /// Replace the reserves of a pool stored as `(token_a, token_b)`
    pub async fn set_reserves(
        &self,
        token_a: &str,
        token_b: &str,
        reserve_a: u128,
        reserve_b: u128,
    ) {
        self.pools.write().await.insert(
            TokenPair::new(token_a, token_b),
            PoolReserves::new(reserve_a, reserve_b),
        );
    }
}

#[async_trait]
impl PoolReader for InMemoryPoolReader {
    async fn get_reserves(
        &self,
        token_a: &str,
        token_b: &str,
    ) -> Result<Option<PoolReserves>, QuoteError> {
        Ok(self
            .pools
            .read()
            .await
            .get(&TokenPair::new(token_a, token_b))
            .copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_pool_in_stored_order() {
        let reader = InMemoryPoolReader::new().with_pool("usdc", "apt", 1000, 2000);

        let lookup = find_pool(&reader, "usdc", "apt").await.unwrap().unwrap();
        assert!(!lookup.reversed);
        assert_eq!(lookup.reserves, PoolReserves::new(1000, 2000));
    }

    #[tokio::test]
    async fn test_find_pool_reversed_flips_reserves() {
        let reader = InMemoryPoolReader::new().with_pool("apt", "usdc", 2000, 1000);

        let lookup = find_pool(&reader, "usdc", "apt").await.unwrap().unwrap();
        assert!(lookup.reversed);
        assert_eq!(lookup.reserves, PoolReserves::new(1000, 2000));
    }

    #[tokio::test]
    async fn test_find_pool_missing() {
        let reader = InMemoryPoolReader::new().with_pool("usdc", "apt", 1000, 2000);
        assert!(find_pool(&reader, "weth", "apt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_reserves() {
        let reader = InMemoryPoolReader::new();
        reader.set_reserves("usdc", "apt", 5, 7).await;

        assert_eq!(
            reader.get_reserves("usdc", "apt").await.unwrap(),
            Some(PoolReserves::new(5, 7))
        );
    }
}
