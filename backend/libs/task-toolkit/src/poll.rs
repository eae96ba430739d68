/// Poll an operation until its result satisfies a condition
use crate::config::ConfigError;
use crate::metrics::PollMetrics;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between attempts
    pub interval: Duration,
    /// Overall budget; no new attempt starts once it is spent
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "poll timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError<E> {
    #[error("Polling timed out after {}ms", .elapsed.as_millis())]
    TimedOut { elapsed: Duration, attempts: u32 },
    #[error("Poll operation failed: {0}")]
    Operation(E),
}

/// Invoke `f` every `interval` until `condition` accepts its value.
pub async fn poll_until<F, Fut, T, E, C>(
    config: PollConfig,
    f: F,
    condition: C,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&T) -> bool,
{
    poll_until_notify(config, f, condition, |_: &T, _| {}).await
}

/// Like [`poll_until`], calling `on_poll(&value, attempt)` after every attempt,
/// including the one that satisfies the condition.
pub async fn poll_until_notify<F, Fut, T, E, C, N>(
    config: PollConfig,
    mut f: F,
    mut condition: C,
    mut on_poll: N,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&T) -> bool,
    N: FnMut(&T, u32),
{
    let start = Instant::now();
    let mut attempt = 0;

    while attempt == 0 || start.elapsed() < config.timeout {
        attempt += 1;
        let value = f().await.map_err(PollError::Operation)?;
        PollMetrics::record_attempt();
        on_poll(&value, attempt);

        if condition(&value) {
            debug!("Poll condition met after {} attempts", attempt);
            return Ok(value);
        }

        tokio::time::sleep(config.interval).await;
    }

    let elapsed = start.elapsed();
    warn!("Polling gave up after {} attempts ({:?})", attempt, elapsed);
    Err(PollError::TimedOut {
        elapsed,
        attempts: attempt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_condition() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let config = PollConfig {
            interval: Duration::from_millis(100),
            timeout: Duration::from_millis(1000),
        };

        let result = poll_until(
            config,
            move || {
                let value = counter_clone.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, String>(value) }
            },
            |v| *v == 3,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let config = PollConfig {
            interval: Duration::from_millis(100),
            timeout: Duration::from_millis(1000),
        };

        let result = poll_until(
            config,
            move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(false) }
            },
            |done| *done,
        )
        .await;

        match result {
            Err(PollError::TimedOut { elapsed, attempts }) => {
                assert!(elapsed >= Duration::from_millis(1000));
                assert!(attempts >= 10);
            }
            other => panic!("expected poll timeout, got {:?}", other),
        }
        assert!(counter.load(Ordering::SeqCst) >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_poll_sees_every_value() {
        let counter = AtomicU32::new(0);
        let mut seen = Vec::new();

        let result = poll_until_notify(
            PollConfig {
                interval: Duration::from_millis(10),
                timeout: Duration::from_secs(1),
            },
            || {
                let value = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, String>(value) }
            },
            |v| *v == 2,
            |v, attempt| seen.push((*v, attempt)),
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[tokio::test]
    async fn test_operation_error_stops_polling() {
        let result = poll_until(
            PollConfig::default(),
            || async { Err::<u32, _>("job lookup failed") },
            |_| true,
        )
        .await;

        assert!(matches!(
            result,
            Err(PollError::Operation("job lookup failed"))
        ));
    }

    #[test]
    fn test_timeout_error_names_elapsed_duration() {
        let err: PollError<String> = PollError::TimedOut {
            elapsed: Duration::from_millis(1500),
            attempts: 15,
        };
        assert_eq!(err.to_string(), "Polling timed out after 1500ms");
    }
}
