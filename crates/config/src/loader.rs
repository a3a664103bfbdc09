//! Configuration loading from multiple sources

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides, e.g. `BATCH_SWAP_BATCH__STOP_ON_ERROR=true`
pub const ENV_PREFIX: &str = "BATCH_SWAP";

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loading configuration file");

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables
    ///
    /// Uses default prefix "BATCH_SWAP"
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Variables take the form PREFIX_SECTION__KEY, for example
    /// BATCH_SWAP_POLLING__INTERVAL_MS=1500. Unset keys keep their defaults.
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        Self::builder().add_env(prefix).build()
    }

    /// Merge two configurations, with overlay taking precedence
    ///
    /// A section of `overlay` replaces the matching section of `base` unless
    /// it is left at its defaults.
    pub fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        let defaults = AppConfig::default();

        AppConfig {
            network: pick(base.network, overlay.network, &defaults.network),
            dex: pick(base.dex, overlay.dex, &defaults.dex),
            batch: pick(base.batch, overlay.batch, &defaults.batch),
            confirmation: pick(
                base.confirmation,
                overlay.confirmation,
                &defaults.confirmation,
            ),
            polling: pick(base.polling, overlay.polling, &defaults.polling),
            quotes: pick(base.quotes, overlay.quotes, &defaults.quotes),
        }
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Individual keys set in the environment win over the file.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        if !path.exists() {
            return Err(ConfigError::LoadError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        Self::builder()
            .add_file(path, true)
            .add_env(env_prefix)
            .build()
    }

    /// Build configuration using the config crate's builder pattern
    ///
    /// This allows for more complex configuration scenarios with multiple sources
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

fn pick<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if &overlay == default {
        base
    } else {
        overlay
    }
}

/// Builder for complex configuration loading scenarios
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        self
    }

    /// Set a default value for a dotted key such as `batch.stop_on_error`
    pub fn set_default(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_default(key, value)?;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BatchConfig, Environment as Env, NetworkConfig};
    use std::io::Write;

    #[test]
    fn test_load_from_toml() {
        let toml = r#"
            [network]
            environment = "mainnet"
            log_level = "debug"

            [batch]
            stop_on_error = true
            delay_between_swaps_ms = 500
            max_price_impact = 5.0

            [confirmation]
            max_retries = 5
        "#;

        let config = ConfigLoader::from_toml(toml).unwrap();
        assert_eq!(config.network.environment, Env::Mainnet);
        assert_eq!(config.network.log_level, "debug");
        assert!(config.batch.stop_on_error);
        assert_eq!(config.batch.max_price_impact, 5.0);
        assert_eq!(config.confirmation.max_retries, 5);
        assert_eq!(config.confirmation.base_delay_ms, 1000);
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
network:
  environment: local
  log_level: trace

polling:
  interval_ms: 1500
  timeout_ms: 30000
  sweep_delay_ms: 2500
        "#;

        let config = ConfigLoader::from_yaml(yaml).unwrap();
        assert_eq!(config.network.environment, Env::Local);
        assert_eq!(config.polling.interval_ms, 1500);
        assert_eq!(config.polling.sweep_delay_ms, 2500);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"
{
  "dex": {
    "module_address": "0xabc",
    "target_token": "0x1::usdc::USDC"
  },
  "quotes": {
    "refresh_interval_ms": 5000,
    "impact_change_threshold": 0.25
  }
}
        "#;

        let config = ConfigLoader::from_json(json).unwrap();
        assert_eq!(config.dex.target_token, "0x1::usdc::USDC");
        assert_eq!(config.quotes.impact_change_threshold, 0.25);
        assert_eq!(config.batch, BatchConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let toml = r#"
[network]
environment = "testnet"
log_level = "warn"
        "#;

        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.network.log_level, "warn");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ConfigLoader::from_file(file.path()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn test_merge_configs() {
        let base = AppConfig {
            network: NetworkConfig {
                log_level: "debug".to_string(),
                ..Default::default()
            },
            batch: BatchConfig {
                stop_on_error: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let overlay = AppConfig {
            network: NetworkConfig {
                environment: Env::Mainnet,
                log_level: "warn".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = ConfigLoader::merge(base, overlay);
        assert_eq!(merged.network.log_level, "warn");
        assert_eq!(merged.network.environment, Env::Mainnet);
        assert!(merged.batch.stop_on_error);
    }
}
