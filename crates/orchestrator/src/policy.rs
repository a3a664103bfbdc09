use rust_decimal::Decimal;
use std::time::Duration;

/// Rules applied while a batch runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Abort the remaining requests after the first failure
    pub stop_on_error: bool,

    /// Pause between attempted swaps; never applied after the last request
    pub delay_between_swaps: Duration,

    /// Requests quoted above this price impact (percent) are skipped
    pub max_price_impact: Decimal,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            stop_on_error: false,
            delay_between_swaps: Duration::from_millis(2000),
            max_price_impact: Decimal::TEN,
        }
    }
}

impl BatchPolicy {
    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_swaps = delay;
        self
    }

    pub fn with_max_price_impact(mut self, max_price_impact: Decimal) -> Self {
        self.max_price_impact = max_price_impact;
        self
    }

    /// Whether a request with this advisory impact must be skipped
    pub fn exceeds_price_impact(&self, price_impact: Option<Decimal>) -> bool {
        price_impact.is_some_and(|impact| impact > self.max_price_impact)
    }
}
