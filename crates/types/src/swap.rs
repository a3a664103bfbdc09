use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Token, TokenPair};

/// A single token-to-target swap requested by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Token being sold
    pub input: Token,

    /// Fixed target token
    pub output: Token,

    /// Positive decimal amount of `input`
    pub amount: String,

    /// Advisory output computed earlier; may be stale
    #[serde(default)]
    pub expected_output: Option<Decimal>,

    /// Advisory price impact in percent; may be stale
    #[serde(default)]
    pub price_impact: Option<Decimal>,

    /// Pool is stored in (output, input) order
    #[serde(default)]
    pub reversed: bool,
}

impl SwapRequest {
    pub fn new(input: Token, output: Token, amount: impl Into<String>) -> Self {
        Self {
            input,
            output,
            amount: amount.into(),
            expected_output: None,
            price_impact: None,
            reversed: false,
        }
    }

    pub fn with_quote(mut self, expected_output: Decimal, price_impact: Decimal) -> Self {
        self.expected_output = Some(expected_output);
        self.price_impact = Some(price_impact);
        self
    }

    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(&self.input.address, &self.output.address)
    }

    /// Parameters handed to the swap submitter
    pub fn submission(&self) -> SwapSubmission {
        SwapSubmission {
            input: self.input.address.clone(),
            output: self.output.address.clone(),
            amount: self.amount.clone(),
            reversed: self.reversed,
        }
    }
}

/// What the swap submitter needs to build and broadcast a swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSubmission {
    pub input: String,
    pub output: String,
    pub amount: String,
    pub reversed: bool,
}

impl SwapSubmission {
    /// Pair in the exchange's stored order
    pub fn pool_order(&self) -> TokenPair {
        let pair = TokenPair::new(&self.input, &self.output);
        if self.reversed {
            pair.reversed()
        } else {
            pair
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> Token {
        Token::new("0x1::usdc::USDC", "USDC", 6)
    }

    fn apt() -> Token {
        Token::new("0x1::aptos_coin::AptosCoin", "APT", 8)
    }

    #[test]
    fn test_submission_pool_order() {
        let request = SwapRequest::new(usdc(), apt(), "10");
        let submission = request.submission();
        assert_eq!(
            submission.pool_order(),
            TokenPair::new("0x1::usdc::USDC", "0x1::aptos_coin::AptosCoin")
        );

        let reversed = request.with_reversed(true).submission();
        assert_eq!(
            reversed.pool_order(),
            TokenPair::new("0x1::aptos_coin::AptosCoin", "0x1::usdc::USDC")
        );
        // the swap direction itself is unchanged
        assert_eq!(reversed.input, "0x1::usdc::USDC");
    }

    #[test]
    fn test_with_quote() {
        let request =
            SwapRequest::new(usdc(), apt(), "10").with_quote(Decimal::new(1974, 2), Decimal::ONE);
        assert_eq!(request.expected_output, Some(Decimal::new(1974, 2)));
        assert_eq!(request.price_impact, Some(Decimal::ONE));
    }
}
