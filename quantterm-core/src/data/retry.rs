//! Bounded retry with exponential backoff and jitter.
//!
//! One policy object applied uniformly by the fallback chain around each
//! provider call, instead of per-function retry annotations. Only transient
//! errors (network, rate limit, 5xx) are retried; a clean "no data" answer
//! gives up immediately so the chain can move to the next source.

use super::provider::FetchError;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Serializable retry settings (config file section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter: 0.1,
        }
    }
}

/// Retry policy: bounded attempts, exponential backoff, capped wait.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, jitter: f64) -> Self {
        assert!(max_attempts >= 1, "retry policy needs at least one attempt");
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter,
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.max_attempts.max(1),
            Duration::from_millis(cfg.base_delay_ms),
            Duration::from_millis(cfg.max_delay_ms),
            cfg.jitter,
        )
    }

    /// Backoff before the given attempt (attempt numbering starts at 1).
    fn delay_before(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt - 2));
        let capped = exp.min(self.max_delay);
        if self.jitter <= 0.0 || capped.is_zero() {
            return capped;
        }
        let spread = capped.as_secs_f64() * self.jitter;
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64((capped.as_secs_f64() + offset).max(0.0))
    }

    /// Run `op` up to `max_attempts` times, sleeping between attempts.
    ///
    /// Returns the first success or the last error. Non-transient errors
    /// short-circuit without further attempts.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Result<T, FetchError>,
    {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.delay_before(attempt);
                debug!(label, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
            }
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => last_err = Some(err),
                Err(err) => return Err(err),
            }
        }
        Err(last_err.expect("at least one attempt ran"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO, 0.0)
    }

    #[test]
    fn transient_errors_are_retried_up_to_max() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy(3).run("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Network("down".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn no_data_short_circuits() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy(4).run("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::NoData { symbol: "ES".into() })
        });
        assert!(matches!(result, Err(FetchError::NoData { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn success_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = instant_policy(3).run("test", || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(FetchError::RateLimited("slow down".into()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_millis(500),
            Duration::from_millis(1_000),
            0.0,
        );
        // attempt 2 -> base, attempt 5 -> base * 8 but capped
        assert_eq!(policy.delay_before(2), Duration::from_millis(500));
        assert_eq!(policy.delay_before(5), Duration::from_millis(1_000));
    }
}
