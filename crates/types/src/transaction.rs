use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{TokenAmount, TokenPair};

/// Prefix of every locally generated placeholder id
pub const PLACEHOLDER_PREFIX: &str = "pending_";

/// Provisional key for a swap the ledger has not assigned a hash to yet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderId(String);

impl PlaceholderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical transaction hash assigned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a transaction record.
///
/// A record starts under a placeholder and is promoted to its hash once the
/// ledger accepts it. The two key spaces never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKey {
    Placeholder(PlaceholderId),
    Hash(TxHash),
}

impl TxKey {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TxKey::Placeholder(_))
    }

    pub fn hash(&self) -> Option<&TxHash> {
        match self {
            TxKey::Hash(hash) => Some(hash),
            TxKey::Placeholder(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TxKey::Placeholder(id) => id.as_str(),
            TxKey::Hash(hash) => hash.as_str(),
        }
    }
}

impl From<PlaceholderId> for TxKey {
    fn from(id: PlaceholderId) -> Self {
        TxKey::Placeholder(id)
    }
}

impl From<TxHash> for TxKey {
    fn from(hash: TxHash) -> Self {
        TxKey::Hash(hash)
    }
}

impl fmt::Display for TxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Success => write!(f, "success"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome reported by the ledger for an indexed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalStatus {
    Success,
    Failed,
}

impl From<FinalStatus> for TxStatus {
    fn from(status: FinalStatus) -> Self {
        match status {
            FinalStatus::Success => TxStatus::Success,
            FinalStatus::Failed => TxStatus::Failed,
        }
    }
}

/// Final status plus the gas figure the ledger reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub status: FinalStatus,
    pub gas_used: Option<String>,
}

impl TransactionOutcome {
    pub fn success() -> Self {
        Self {
            status: FinalStatus::Success,
            gas_used: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: FinalStatus::Failed,
            gas_used: None,
        }
    }

    pub fn with_gas_used(mut self, gas_used: impl Into<String>) -> Self {
        self.gas_used = Some(gas_used.into());
        self
    }
}

/// A swap transaction as seen by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub key: TxKey,
    pub status: TxStatus,
    /// Creation time, unix milliseconds
    pub timestamp_ms: i64,
    pub input: TokenAmount,
    pub output: TokenAmount,
    pub gas_used: Option<String>,
}

impl TransactionRecord {
    pub fn pending(key: TxKey, input: TokenAmount, output: TokenAmount, timestamp_ms: i64) -> Self {
        Self {
            key,
            status: TxStatus::Pending,
            timestamp_ms,
            input,
            output,
            gas_used: None,
        }
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(&self.input.address, &self.output.address)
    }

    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }

    /// Pending and already known to the ledger
    pub fn awaits_confirmation(&self) -> bool {
        self.is_pending() && !self.key.is_placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(symbol: &str, address: &str) -> TokenAmount {
        TokenAmount {
            symbol: symbol.to_string(),
            amount: "1".to_string(),
            address: address.to_string(),
            decimals: 8,
        }
    }

    #[test]
    fn test_key_spaces_never_conflate() {
        let placeholder = TxKey::from(PlaceholderId::new("pending_1_abc"));
        let hash = TxKey::from(TxHash::new("pending_1_abc"));

        assert_ne!(placeholder, hash);
        assert!(placeholder.is_placeholder());
        assert_eq!(hash.hash(), Some(&TxHash::new("pending_1_abc")));
    }

    #[test]
    fn test_awaits_confirmation() {
        let mut record = TransactionRecord::pending(
            TxKey::Placeholder(PlaceholderId::new("pending_1")),
            amount("USDC", "usdc"),
            amount("APT", "apt"),
            0,
        );
        assert!(!record.awaits_confirmation());

        record.key = TxKey::Hash(TxHash::new("0xabc"));
        assert!(record.awaits_confirmation());

        record.status = TxStatus::Success;
        assert!(!record.awaits_confirmation());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&TxStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(TxStatus::from(FinalStatus::Failed), TxStatus::Failed);
    }
}
