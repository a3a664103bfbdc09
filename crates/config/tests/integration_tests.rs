//! Integration tests for the config crate

use batch_swap_config::{
    validate_config, AppConfig, ConfigLoader, Environment, PollingConfig,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
}

fn temp_file(suffix: &str) -> NamedTempFile {
    tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
}

#[test]
fn test_load_testnet_config() {
    let config =
        ConfigLoader::from_file(&shipped("testnet.toml")).expect("Failed to load testnet config");

    assert_eq!(config.network.environment, Environment::Testnet);
    assert_eq!(config.network.log_level, "debug");
    assert_eq!(config.dex.target_token, "0x1::aptos_coin::AptosCoin");
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_load_local_config() {
    let config =
        ConfigLoader::from_file(&shipped("local.toml")).expect("Failed to load local config");

    assert_eq!(config.network.environment, Environment::Local);
    assert_eq!(config.network.log_level, "trace");
    assert!(config.batch.stop_on_error);
    assert_eq!(config.batch.delay_between_swaps(), Duration::ZERO);
    assert_eq!(config.polling.interval(), Duration::from_millis(500));

    // keys missing from the file keep their defaults
    assert_eq!(config.confirmation.multiplier, 2.0);
    assert_eq!(config.quotes, Default::default());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_load_yaml_file() {
    let mut file = temp_file(".yaml");
    writeln!(
        file,
        r#"
batch:
  stop_on_error: true
  max_price_impact: 5.0
polling:
  interval_ms: 1000
"#
    )
    .unwrap();

    let config = ConfigLoader::from_file(file.path()).unwrap();
    assert!(config.batch.stop_on_error);
    assert_eq!(config.batch.max_price_impact, 5.0);
    assert_eq!(config.polling.interval_ms, 1000);
    assert_eq!(config.polling.timeout_ms, 60_000);
}

#[test]
fn test_load_json_file() {
    let mut file = temp_file(".json");
    writeln!(
        file,
        r#"{{"dex": {{"target_token": "0x1::usdt::USDT"}}}}"#
    )
    .unwrap();

    let config = ConfigLoader::from_file(file.path()).unwrap();
    assert_eq!(config.dex.target_token, "0x1::usdt::USDT");
    assert_eq!(config.network, Default::default());
}

#[test]
fn test_env_overrides_file() {
    let mut file = temp_file(".toml");
    writeln!(
        file,
        r#"
[polling]
interval_ms = 4000
timeout_ms = 40000
"#
    )
    .unwrap();

    // prefix unique to this test so parallel tests never observe it
    std::env::set_var("BSCFG_IT_POLLING__INTERVAL_MS", "1500");
    let config = ConfigLoader::from_file_with_env(file.path(), "BSCFG_IT").unwrap();
    std::env::remove_var("BSCFG_IT_POLLING__INTERVAL_MS");

    assert_eq!(config.polling.interval_ms, 1500);
    assert_eq!(config.polling.timeout_ms, 40_000);
}

#[test]
fn test_missing_file_with_env() {
    let path = std::env::temp_dir().join("batch-swap-missing-config.toml");
    assert!(ConfigLoader::from_file_with_env(&path, "BSCFG_MISSING").is_err());
}

#[test]
fn test_merge_then_validate() {
    let base = ConfigLoader::from_file(&shipped("testnet.toml")).unwrap();
    let overlay = AppConfig {
        polling: PollingConfig {
            interval_ms: 10_000,
            timeout_ms: 5_000,
            ..Default::default()
        },
        ..Default::default()
    };

    let merged = ConfigLoader::merge(base.clone(), overlay);
    assert_eq!(merged.network, base.network);
    assert_eq!(merged.polling.interval_ms, 10_000);

    let err = validate_config(&merged).unwrap_err().to_string();
    assert!(err.contains("polling.timeout_ms"));
}
