//! Bounded retries with exponential backoff.
//!
//! The attempt budget comes from the `retry-count` input. Delays grow
//! exponentially between attempts and carry a small random jitter; there is
//! never a delay after the final attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Always >= 1.
    max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub backoff_multiplier: f64,
    /// Jitter as a fraction of the delay (0.0 to 1.0).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget (clamped to at least 1).
    pub fn new(max_attempts: u32) -> Self {
        Self::default().with_max_attempts(max_attempts)
    }

    /// A policy that retries immediately, without waiting.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_factor: 0.0,
            ..Self::new(max_attempts)
        }
    }

    /// Sets the attempt budget (clamped to at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the jitter factor.
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Returns the attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given zero-based failed attempt, without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let millis =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }

    /// Delay to wait after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.base_delay(attempt);
        if self.jitter_factor <= 0.0 || delay.is_zero() {
            return delay;
        }

        let range = delay.as_millis() as f64 * self.jitter_factor;
        let jitter = rand::thread_rng().gen_range(-range..=range);
        Duration::from_millis((delay.as_millis() as f64 + jitter).max(0.0) as u64)
    }

    /// Runs `operation` until it succeeds or the budget is exhausted.
    ///
    /// Each failure is logged as a warning naming `label`. The error of the
    /// final attempt is returned as-is.
    pub async fn run<F, Fut, T, E>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    tracing::warn!(
                        "{} call failed on attempt {} of {}. ({})",
                        label,
                        attempt + 1,
                        self.max_attempts,
                        error
                    );

                    if attempt + 1 >= self.max_attempts {
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt);
                    if !delay.is_zero() {
                        tracing::debug!("Retrying in {:?}", delay);
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
