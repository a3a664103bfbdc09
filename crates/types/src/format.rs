//! Display helpers for atomic token amounts and addresses

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest precision a `Decimal` scale can express
const MAX_DECIMALS: u8 = 28;

/// Format an atomic amount for display.
///
/// `0` for zero or unparsable input, `<0.0001` for dust, 6 places below one,
/// 4 places below one thousand, otherwise grouped thousands with at most 2 places.
pub fn format_amount(atomic: &str, decimals: u8) -> String {
    let Some(value) = to_units(atomic, decimals) else {
        return "0".to_string();
    };

    if value.is_zero() {
        return "0".to_string();
    }
    if value < Decimal::new(1, 4) {
        return "<0.0001".to_string();
    }
    if value < Decimal::ONE {
        return fixed(value, 6);
    }
    if value < Decimal::ONE_THOUSAND {
        return fixed(value, 4);
    }

    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string();
    let (integer, fraction) = match rounded.split_once('.') {
        Some((integer, fraction)) => (integer.to_string(), Some(fraction.to_string())),
        None => (rounded, None),
    };

    let grouped = group_thousands(&integer);
    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}

/// Shorten an address to `first8...last6`
pub fn format_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("{head}...{tail}")
}

/// Convert a human amount to atomic units, flooring extra precision.
///
/// Returns `0` when the amount cannot be parsed.
pub fn parse_amount_to_atomic(amount: &str, decimals: u8) -> String {
    let Ok(value) = Decimal::from_str(amount.trim()) else {
        return "0".to_string();
    };
    if decimals > MAX_DECIMALS {
        return "0".to_string();
    }

    let unit = Decimal::from_i128_with_scale(10i128.pow(decimals as u32), 0);
    match value.checked_mul(unit) {
        Some(atomic) => atomic.floor().normalize().to_string(),
        None => "0".to_string(),
    }
}

fn to_units(atomic: &str, decimals: u8) -> Option<Decimal> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let raw = Decimal::from_str(atomic.trim()).ok()?;
    raw.checked_mul(Decimal::from_i128_with_scale(1, decimals as u32))
}

fn fixed(value: Decimal, places: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded.to_string()
}

fn group_thousands(integer: &str) -> String {
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
