use std::time::Duration;

/// Delay schedule that grows geometrically from `initial` up to `max`.
///
/// The n-th call to [`next_delay`](Self::next_delay) (starting at zero)
/// yields `initial * multiplier^n`, capped at `max`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    current_attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            multiplier: 2.0,
            current_attempt: 0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay for a given zero-based step, without advancing the schedule
    pub fn delay_for(&self, step: u32) -> Duration {
        if step == 0 {
            return self.initial.min(self.max);
        }

        let factor = self.multiplier.powi(step.min(i32::MAX as u32) as i32);
        let delay_ms = (self.initial.as_millis() as f64 * factor).min(self.max.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.current_attempt);
        self.current_attempt = self.current_attempt.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}
