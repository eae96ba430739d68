/// Retry policy with deterministic exponential backoff
use crate::config::ConfigError;
use crate::metrics::RetryMetrics;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff (±30%). Off by default so delays are reproducible.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_backoff.is_zero() {
            return Err(ConfigError::Invalid(
                "retry initial_backoff must be greater than zero".to_string(),
            ));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ConfigError::Invalid(format!(
                "retry max_backoff ({:?}) must be >= initial_backoff ({:?})",
                self.max_backoff, self.initial_backoff
            )));
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "retry backoff_multiplier must be >= 1, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// Delay to wait after failed attempt `attempt` (1-based), before jitter:
    /// `min(initial_backoff * multiplier^(attempt - 1), max_backoff)`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Execute an operation with retry logic.
///
/// Returns the first success, or the error from the final attempt once
/// `max_retries` retries are exhausted.
pub async fn with_retry<F, Fut, T, E>(config: RetryConfig, f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_notify(config, f, |_: &E, _| {}).await
}

/// Like [`with_retry`], calling `on_retry(&error, attempt)` once each backoff
/// delay has elapsed, right before the next attempt.
pub async fn with_retry_notify<F, Fut, T, E, N>(
    config: RetryConfig,
    mut f: F,
    mut on_retry: N,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    N: FnMut(&E, u32),
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                RetryMetrics::record_attempts("success", attempt + 1);
                return Ok(result);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    if config.max_retries > 0 {
                        warn!("Max retries ({}) reached: {}", config.max_retries, e);
                    }
                    RetryMetrics::record_attempts("failure", attempt);
                    return Err(e);
                }

                let delay = calculate_backoff(config.backoff_for(attempt), config.jitter);

                warn!(
                    "Retry attempt {}/{} after error: {}, waiting {:?}",
                    attempt, config.max_retries, e, delay
                );

                tokio::time::sleep(delay).await;
                on_retry(&e, attempt);
            }
        }
    }
}

fn calculate_backoff(base: Duration, jitter: bool) -> Duration {
    if jitter {
        let mut rng = rand::thread_rng();
        let jitter_factor = 1.0 + rng.gen_range(-0.3..0.3); // ±30%
        base.mul_f64(jitter_factor)
    } else {
        base
    }
}
