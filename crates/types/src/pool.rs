use serde::{Deserialize, Serialize};

/// Reserves of a constant-product pool, oriented input side first.
///
/// Fetched fresh for every quote; callers own any caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub input_reserve: u128,
    pub output_reserve: u128,
}

impl PoolReserves {
    pub fn new(input_reserve: u128, output_reserve: u128) -> Self {
        Self {
            input_reserve,
            output_reserve,
        }
    }

    /// A pool with an empty side cannot quote
    pub fn has_liquidity(&self) -> bool {
        self.input_reserve > 0 && self.output_reserve > 0
    }

    /// Swap the reserve roles, used when the pool is stored in the opposite order
    pub fn flipped(&self) -> Self {
        Self {
            input_reserve: self.output_reserve,
            output_reserve: self.input_reserve,
        }
    }
}
