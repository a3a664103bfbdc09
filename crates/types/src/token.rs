use serde::{Deserialize, Serialize};

/// A fungible token visible to the connected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Fully qualified coin type (e.g., "0x1::aptos_coin::AptosCoin")
    pub address: String,

    /// Ticker symbol
    pub symbol: String,

    /// Human readable name
    pub name: String,

    /// Decimal precision of the atomic unit
    pub decimals: u8,

    /// Balance in atomic units
    #[serde(default)]
    pub balance: String,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        let symbol = symbol.into();
        Self {
            address: address.into(),
            name: symbol.clone(),
            symbol,
            decimals,
            balance: "0".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_balance(mut self, balance: impl Into<String>) -> Self {
        self.balance = balance.into();
        self
    }

    /// Describe `amount` of this token for a transaction record
    pub fn amount(&self, amount: impl Into<String>) -> TokenAmount {
        TokenAmount {
            symbol: self.symbol.clone(),
            amount: amount.into(),
            address: self.address.clone(),
            decimals: self.decimals,
        }
    }
}

/// Ordered (input, output) token pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub input: String,
    pub output: String,
}

impl TokenPair {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            input: self.output.clone(),
            output: self.input.clone(),
        }
    }
}

/// Token side of a transaction record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub symbol: String,
    pub amount: String,
    pub address: String,
    pub decimals: u8,
}
