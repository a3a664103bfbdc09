//! Core configuration structures for the batch swap core

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Network configuration
    pub network: NetworkConfig,

    /// Exchange configuration
    pub dex: DexConfig,

    /// Batch execution policy
    pub batch: BatchConfig,

    /// Confirmation retry schedule
    pub confirmation: ConfirmationConfig,

    /// Background polling of pending transactions
    pub polling: PollingConfig,

    /// Advisory quote refresh
    pub quotes: QuoteConfig,
}

/// Network environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Environment type (mainnet, testnet, local)
    pub environment: Environment,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Ledger REST endpoint
    pub ledger_url: String,

    /// Explorer link template, `{hash}` is substituted
    pub explorer_url: String,
}

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Mainnet,
    Testnet,
    Local,
}

/// Exchange configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    /// Address of the exchange module holding the pools
    pub module_address: String,

    /// Token every swap is converted into
    pub target_token: String,
}

/// Batch execution policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Abort the remaining swaps after the first failure
    pub stop_on_error: bool,

    /// Pause between swaps in milliseconds
    pub delay_between_swaps_ms: u64,

    /// Maximum advisory price impact in percent
    pub max_price_impact: f64,
}

/// Confirmation retry schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Retries after the first status query
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,

    /// Growth factor between retries
    pub multiplier: f64,

    /// Upper bound on a single retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Bound on a single status query in milliseconds
    pub attempt_timeout_ms: u64,
}

/// Background polling of pending transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between status queries in milliseconds
    pub interval_ms: u64,

    /// Give up on a transaction after this many milliseconds
    pub timeout_ms: u64,

    /// Pause between sweep cycles in milliseconds
    pub sweep_delay_ms: u64,
}

/// Advisory quote refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Refresh interval in milliseconds
    pub refresh_interval_ms: u64,

    /// Price impact movement, in percentage points, that counts as a change
    pub impact_change_threshold: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Testnet,
            log_level: "info".to_string(),
            log_json: false,
            ledger_url: "https://fullnode.testnet.aptoslabs.com/v1".to_string(),
            explorer_url: "https://explorer.aptoslabs.com/txn/{hash}?network=testnet".to_string(),
        }
    }
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            module_address: "0x190d44266241744264b964a37b8f09863167a12d3e70cda39376cfb4e3561e12"
                .to_string(),
            target_token: "0x1::aptos_coin::AptosCoin".to_string(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stop_on_error: false,
            delay_between_swaps_ms: 2000,
            max_price_impact: 10.0,
        }
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
            attempt_timeout_ms: 30_000,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            timeout_ms: 60_000,
            sweep_delay_ms: 5000,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 10_000,
            impact_change_threshold: 0.1,
        }
    }
}

impl BatchConfig {
    pub fn delay_between_swaps(&self) -> Duration {
        Duration::from_millis(self.delay_between_swaps_ms)
    }
}

impl ConfirmationConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }
}

impl QuoteConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl AppConfig {
    /// Defaults for a local development ledger
    pub fn local() -> Self {
        Self {
            network: NetworkConfig {
                environment: Environment::Local,
                log_level: "debug".to_string(),
                ledger_url: "http://127.0.0.1:8080/v1".to_string(),
                explorer_url: "https://explorer.aptoslabs.com/txn/{hash}?network=local"
                    .to_string(),
                ..Default::default()
            },
            batch: BatchConfig {
                delay_between_swaps_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
