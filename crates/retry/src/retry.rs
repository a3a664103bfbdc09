use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::ExponentialBackoff;

/// How often and how patiently to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubles (by `multiplier`) afterwards
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Bound on a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Default::default()
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// First attempt plus every retry
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.max_delay).with_multiplier(self.multiplier)
    }
}

/// Why a single attempt did not produce a value
#[derive(Debug, Error)]
pub enum AttemptFailure<E> {
    #[error("{0}")]
    Failed(E),

    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: AttemptFailure<E>,
    },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn last_failure(&self) -> &AttemptFailure<E> {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// Each attempt is bounded by `attempt_timeout`; a timed-out attempt counts
/// as a failed one. Between attempts the task sleeps for the next backoff
/// delay. `op` receives the one-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let total = policy.total_attempts();
    let mut backoff = policy.backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let failure = match timeout(policy.attempt_timeout, op(attempt)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => AttemptFailure::Failed(e),
            Err(_) => AttemptFailure::TimedOut(policy.attempt_timeout),
        };

        if attempt >= total {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: failure,
            });
        }

        let delay = backoff.next_delay();
        debug!(
            attempt,
            max_attempts = total,
            delay_ms = delay.as_millis() as u64,
            error = %failure,
            "Attempt failed, retrying"
        );
        sleep(delay).await;
    }
}
