//! Translation of [`AppConfig`] into component settings

use batch_swap_config::AppConfig;
use batch_swap_orchestrator::BatchPolicy;
use batch_swap_retry::RetryPolicy;
use batch_swap_tracker::{SweepSettings, TrackerConfig};
use rust_decimal::Decimal;

use crate::SessionError;

pub fn tracker_config(config: &AppConfig) -> TrackerConfig {
    let confirmation = &config.confirmation;
    let polling = &config.polling;

    TrackerConfig {
        confirmation: RetryPolicy::new(confirmation.max_retries, confirmation.base_delay())
            .with_multiplier(confirmation.multiplier)
            .with_max_delay(confirmation.max_delay())
            .with_attempt_timeout(confirmation.attempt_timeout()),
        sweep: SweepSettings {
            poll_interval: polling.interval(),
            poll_timeout: polling.timeout(),
            sweep_delay: polling.sweep_delay(),
        },
        explorer_url: config.network.explorer_url.clone(),
    }
}

pub fn batch_policy(config: &AppConfig) -> Result<BatchPolicy, SessionError> {
    let max_price_impact = to_decimal("batch.max_price_impact", config.batch.max_price_impact)?;

    Ok(BatchPolicy::default()
        .with_stop_on_error(config.batch.stop_on_error)
        .with_delay(config.batch.delay_between_swaps())
        .with_max_price_impact(max_price_impact))
}

pub fn impact_change_threshold(config: &AppConfig) -> Result<Decimal, SessionError> {
    to_decimal(
        "quotes.impact_change_threshold",
        config.quotes.impact_change_threshold,
    )
}

fn to_decimal(field: &str, value: f64) -> Result<Decimal, SessionError> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|e| SessionError::InvalidSetting {
            field: field.to_string(),
            reason: e.to_string(),
        })
}
