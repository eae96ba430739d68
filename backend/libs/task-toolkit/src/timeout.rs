/// Timeout wrapper for async operations
///
/// The guarded future is dropped when the deadline fires, so it is cancelled
/// at its next suspension point. Anything it already handed to
/// `tokio::spawn` keeps running in the background; only its result is lost.
use crate::config::ConfigError;
use crate::metrics::TimeoutMetrics;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
    /// Overrides the default "Operation timed out after {ms}ms" message
    pub message: Option<String>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
            message: None,
        }
    }
}

impl TimeoutConfig {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "timeout duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn elapsed<E>(&self) -> TimeoutError<E> {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| default_message(self.duration));
        TimeoutError::Elapsed {
            duration: self.duration,
            message,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E = std::convert::Infallible> {
    #[error("{message}")]
    Elapsed { duration: Duration, message: String },
    #[error("Operation failed: {0}")]
    Operation(E),
}

impl<E> TimeoutError<E> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed { .. })
    }
}

fn default_message(duration: Duration) -> String {
    format!("Operation timed out after {}ms", duration.as_millis())
}

/// Execute a future with timeout
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    let config = TimeoutConfig::new(duration);
    match timeout(duration, future).await {
        Ok(result) => {
            TimeoutMetrics::record_operation("success");
            Ok(result)
        }
        Err(_) => {
            warn!("Operation timed out after {:?}", duration);
            TimeoutMetrics::record_operation("timeout");
            Err(config.elapsed())
        }
    }
}

/// Execute a fallible future with timeout
pub async fn with_timeout_result<F, T, E>(
    duration: Duration,
    future: F,
) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    with_timeout_config(&TimeoutConfig::new(duration), future).await
}

/// Execute a fallible future with a configured timeout and message
pub async fn with_timeout_config<F, T, E>(
    config: &TimeoutConfig,
    future: F,
) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(config.duration, future).await {
        Ok(Ok(result)) => {
            TimeoutMetrics::record_operation("success");
            Ok(result)
        }
        Ok(Err(e)) => {
            TimeoutMetrics::record_operation("error");
            Err(TimeoutError::Operation(e))
        }
        Err(_) => {
            warn!("Operation timed out after {:?}", config.duration);
            TimeoutMetrics::record_operation("timeout");
            Err(config.elapsed())
        }
    }
}
