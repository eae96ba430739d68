/// Environment-driven defaults for the toolkit
///
/// Every variable is optional and prefixed with `TASK_TOOLKIT_`, e.g.
/// `TASK_TOOLKIT_RETRY_MAX_ATTEMPTS=5` or `TASK_TOOLKIT_POLL_INTERVAL_MS=250`.
use crate::batch::BatchConfig;
use crate::poll::PollConfig;
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PREFIX: &str = "TASK_TOOLKIT_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to load configuration from environment: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolkitSettings {
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: f64,
    #[serde(default)]
    pub retry_jitter: bool,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub batch_delay_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    10_000
}

fn default_retry_backoff_multiplier() -> f64 {
    2.0
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_batch_size() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_ms() -> u64 {
    30_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_cache_ttl_ms() -> u64 {
    60_000
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            retry_max_attempts: default_retry_max_attempts(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            retry_jitter: false,
            timeout_ms: default_timeout_ms(),
            concurrency_limit: default_concurrency_limit(),
            batch_size: default_batch_size(),
            batch_delay_ms: 0,
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            debounce_ms: default_debounce_ms(),
            throttle_ms: default_throttle_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

impl ToolkitSettings {
    /// Load settings from `TASK_TOOLKIT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load settings from an explicit set of variables (prefix included)
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: ToolkitSettings = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry().validate()?;
        self.timeout().validate()?;
        self.poll().validate()?;
        if self.concurrency_limit == 0 {
            return Err(ConfigError::Invalid(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.retry_max_attempts,
            initial_backoff: Duration::from_millis(self.retry_initial_delay_ms),
            max_backoff: Duration::from_millis(self.retry_max_delay_ms),
            backoff_multiplier: self.retry_backoff_multiplier,
            jitter: self.retry_jitter,
        }
    }

    pub fn timeout(&self) -> TimeoutConfig {
        TimeoutConfig::new(Duration::from_millis(self.timeout_ms))
    }

    pub fn poll(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }

    pub fn batch(&self) -> BatchConfig {
        BatchConfig {
            batch_size: self.batch_size,
            delay_between_batches: (self.batch_delay_ms > 0)
                .then(|| Duration::from_millis(self.batch_delay_ms)),
            concurrency: None,
        }
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn throttle_cooldown(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = ToolkitSettings::from_vars(Vec::new()).unwrap();
        assert_eq!(settings.retry_max_attempts, 3);
        assert_eq!(settings.timeout().duration, Duration::from_secs(30));
        assert_eq!(settings.concurrency_limit, 5);
        assert!(settings.batch().delay_between_batches.is_none());
    }

    #[test]
    fn test_prefixed_overrides() {
        let settings = ToolkitSettings::from_vars(vars(&[
            ("TASK_TOOLKIT_RETRY_MAX_ATTEMPTS", "5"),
            ("TASK_TOOLKIT_RETRY_INITIAL_DELAY_MS", "200"),
            ("TASK_TOOLKIT_BATCH_DELAY_MS", "50"),
            ("TASK_TOOLKIT_POLL_INTERVAL_MS", "250"),
            ("UNRELATED_VAR", "ignored"),
        ]))
        .unwrap();

        let retry = settings.retry();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.initial_backoff, Duration::from_millis(200));
        assert_eq!(
            settings.batch().delay_between_batches,
            Some(Duration::from_millis(50))
        );
        assert_eq!(settings.poll().interval, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = ToolkitSettings::from_vars(vars(&[("TASK_TOOLKIT_CONCURRENCY_LIMIT", "0")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = ToolkitSettings::from_vars(vars(&[
            ("TASK_TOOLKIT_RETRY_INITIAL_DELAY_MS", "5000"),
            ("TASK_TOOLKIT_RETRY_MAX_DELAY_MS", "100"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unparseable_value_is_env_error() {
        let result = ToolkitSettings::from_vars(vars(&[("TASK_TOOLKIT_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
