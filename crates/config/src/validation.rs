//! Configuration validation

use crate::{AppConfig, ConfigError, Result};

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let errors = collect_errors(config);

    // Return all errors if any were found
    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Every problem found in `config`, in field order
pub fn collect_errors(config: &AppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Network
    if let Err(e) = validate_log_level(&config.network.log_level) {
        errors.push(e);
    }

    if let Err(e) = validate_url(&config.network.ledger_url) {
        errors.push(ValidationError::new("network.ledger_url", e));
    }

    if !config.network.explorer_url.contains("{hash}") {
        errors.push(ValidationError::new(
            "network.explorer_url",
            "template must contain {hash}",
        ));
    }

    // Exchange
    if config.dex.module_address.is_empty() {
        errors.push(ValidationError::new(
            "dex.module_address",
            "module address is required",
        ));
    }

    if config.dex.target_token.is_empty() {
        errors.push(ValidationError::new(
            "dex.target_token",
            "target token is required",
        ));
    }

    // Batch policy
    let impact = config.batch.max_price_impact;
    if !(impact > 0.0 && impact <= 100.0) {
        errors.push(ValidationError::new(
            "batch.max_price_impact",
            "must be greater than 0 and at most 100",
        ));
    }

    // Confirmation
    if config.confirmation.base_delay_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.base_delay_ms",
            "must be greater than 0",
        ));
    }

    if config.confirmation.multiplier.is_nan() || config.confirmation.multiplier < 1.0 {
        errors.push(ValidationError::new(
            "confirmation.multiplier",
            "must be at least 1.0",
        ));
    }

    if config.confirmation.max_delay_ms < config.confirmation.base_delay_ms {
        errors.push(ValidationError::new(
            "confirmation.max_delay_ms",
            "must be >= base_delay_ms",
        ));
    }

    if config.confirmation.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.attempt_timeout_ms",
            "must be greater than 0",
        ));
    }

    // Polling
    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new(
            "polling.interval_ms",
            "must be greater than 0",
        ));
    }

    if config.polling.timeout_ms < config.polling.interval_ms {
        errors.push(ValidationError::new(
            "polling.timeout_ms",
            "must be >= interval_ms",
        ));
    }

    if config.polling.sweep_delay_ms == 0 {
        errors.push(ValidationError::new(
            "polling.sweep_delay_ms",
            "must be greater than 0",
        ));
    }

    // Quotes
    let threshold = config.quotes.impact_change_threshold;
    if threshold.is_nan() || threshold < 0.0 {
        errors.push(ValidationError::new(
            "quotes.impact_change_threshold",
            "must not be negative",
        ));
    }

    errors
}

/// Validate a URL
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    // Basic URL validation - check for scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    Ok(())
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "network.log_level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BatchConfig, ConfirmationConfig, NetworkConfig, PollingConfig};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
        assert!(validate_config(&AppConfig::local()).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = AppConfig {
            network: NetworkConfig {
                log_level: "loud".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "network.log_level");
    }

    #[test]
    fn test_validate_price_impact_bounds() {
        for impact in [0.0, -1.0, 100.5, f64::NAN] {
            let config = AppConfig {
                batch: BatchConfig {
                    max_price_impact: impact,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(validate_config(&config).is_err(), "accepted {impact}");
        }
    }

    #[test]
    fn test_validate_reports_every_field() {
        let config = AppConfig {
            network: NetworkConfig {
                explorer_url: "https://explorer.example/txn".to_string(),
                ..Default::default()
            },
            confirmation: ConfirmationConfig {
                multiplier: 0.5,
                attempt_timeout_ms: 0,
                ..Default::default()
            },
            polling: PollingConfig {
                interval_ms: 5000,
                timeout_ms: 1000,
                ..Default::default()
            },
            ..Default::default()
        };

        let fields: Vec<String> = collect_errors(&config)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "network.explorer_url",
                "confirmation.multiplier",
                "confirmation.attempt_timeout_ms",
                "polling.timeout_ms",
            ]
        );

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("polling.timeout_ms"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://fullnode.testnet.aptoslabs.com/v1").is_ok());
        assert!(validate_url("http://127.0.0.1:8080").is_ok());

        assert!(validate_url("").is_err());
        assert!(validate_url("fullnode").is_err());
    }
}
