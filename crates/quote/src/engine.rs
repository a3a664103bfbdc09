//! Constant-product swap math
//!
//! Output for a pool holding `r_in` and `r_out` of the two tokens:
//!
//! ```text
//! out = (amount * 0.997 * r_out) / (r_in + amount * 0.997)
//! ```
//!
//! The output is rounded to 8 places. Price impact compares the pool price
//! before and after the trade, using the unrounded output.

use batch_swap_types::POOL_FEE_BPS;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::QuoteError;

/// Places kept on a quoted output amount
pub const OUTPUT_DECIMALS: u32 = 8;

/// Result of quoting a single swap against a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Expected output in whole target units, 8 places
    pub output_amount: Decimal,

    /// Price movement caused by the trade, in percent
    pub price_impact: Decimal,
}

/// Fraction of the input that reaches the pool after fees
pub fn fee_multiplier() -> Decimal {
    Decimal::ONE - Decimal::new(POOL_FEE_BPS as i64, 4)
}

/// Parse a user-entered amount, rejecting anything that is not strictly positive
pub fn parse_amount(amount: &str) -> Result<Decimal, QuoteError> {
    let value = Decimal::from_str(amount.trim()).map_err(|e| QuoteError::InvalidInput {
        reason: format!("'{amount}' is not a decimal amount: {e}"),
    })?;

    if value <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            reason: format!("amount must be positive, got {value}"),
        });
    }

    Ok(value)
}

/// Quote `input_amount` against a pool with the given reserves
pub fn compute_quote(
    input_reserve: u128,
    output_reserve: u128,
    input_amount: Decimal,
) -> Result<Quote, QuoteError> {
    if input_amount <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            reason: format!("amount must be positive, got {input_amount}"),
        });
    }
    if input_reserve == 0 || output_reserve == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let r_in = reserve(input_reserve)?;
    let r_out = reserve(output_reserve)?;

    let with_fee = input_amount
        .checked_mul(fee_multiplier())
        .ok_or_else(overflow)?;
    let numerator = with_fee.checked_mul(r_out).ok_or_else(overflow)?;
    let denominator = r_in.checked_add(with_fee).ok_or_else(overflow)?;
    let exact = numerator.checked_div(denominator).ok_or_else(overflow)?;

    let output_amount =
        exact.round_dp_with_strategy(OUTPUT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    if output_amount <= Decimal::ZERO {
        return Err(QuoteError::InvalidOutput {
            output: output_amount,
        });
    }

    // Spot price can underflow to zero on very lopsided pools
    let price_before = r_out.checked_div(r_in).ok_or_else(overflow)?;
    let reserve_in_after = r_in.checked_add(input_amount).ok_or_else(overflow)?;
    let price_after = r_out
        .checked_sub(exact)
        .and_then(|remaining| remaining.checked_div(reserve_in_after))
        .ok_or_else(overflow)?;
    let price_impact = (price_before - price_after)
        .abs()
        .checked_div(price_before)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(overflow)?
        .max(Decimal::ZERO);

    Ok(Quote {
        output_amount,
        price_impact,
    })
}

fn reserve(value: u128) -> Result<Decimal, QuoteError> {
    Decimal::from_u128(value).ok_or_else(|| QuoteError::InvalidInput {
        reason: format!("reserve {value} exceeds decimal range"),
    })
}

fn overflow() -> QuoteError {
    QuoteError::InvalidInput {
        reason: "arithmetic overflow".to_string(),
    }
}
