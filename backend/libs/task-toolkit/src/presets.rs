/// Preset configurations for common call sites
use crate::batch::BatchConfig;
use crate::poll::PollConfig;
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for one kind of call site
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub timeout: TimeoutConfig,
    pub retry: Option<RetryConfig>,
    pub concurrency: Option<usize>,
    pub batch: Option<BatchConfig>,
    pub poll: Option<PollConfig>,
    pub debounce: Option<Duration>,
    pub throttle: Option<Duration>,
    pub cache_ttl: Option<Duration>,
}

impl TaskConfig {
    fn with_timeout(duration: Duration) -> Self {
        Self {
            timeout: TimeoutConfig::new(duration),
            retry: None,
            concurrency: None,
            batch: None,
            poll: None,
            debounce: None,
            throttle: None,
            cache_ttl: None,
        }
    }
}

/// API client requests (idempotent reads)
///
/// - Timeout: 10s
/// - Retry: 3 attempts, 1s doubling to 10s
pub fn api_request_config() -> TaskConfig {
    TaskConfig {
        retry: Some(RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(10))
    }
}

/// Form submissions
///
/// - Timeout: 15s
/// - Retry: 1 attempt (avoid duplicate listings)
pub fn form_submission_config() -> TaskConfig {
    TaskConfig {
        retry: Some(RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: false,
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(15))
    }
}

/// Search-as-you-type input
///
/// - Debounce: 300ms
/// - Timeout: 5s, no retry (the next keystroke supersedes it anyway)
pub fn search_input_config() -> TaskConfig {
    TaskConfig {
        debounce: Some(Duration::from_millis(300)),
        ..TaskConfig::with_timeout(Duration::from_secs(5))
    }
}

/// Auto-save of drafts
///
/// - Debounce: 1s of idle typing
/// - Throttle: at most one save every 5s
pub fn autosave_config() -> TaskConfig {
    TaskConfig {
        debounce: Some(Duration::from_secs(1)),
        throttle: Some(Duration::from_secs(5)),
        retry: Some(RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
            backoff_multiplier: 2.0,
            jitter: false,
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(10))
    }
}

/// Listing/search fetches over many records
///
/// - Concurrency: 5 in flight
/// - Batches of 20 with a 250ms pause
pub fn listing_fetch_config() -> TaskConfig {
    TaskConfig {
        concurrency: Some(5),
        batch: Some(BatchConfig {
            batch_size: 20,
            delay_between_batches: Some(Duration::from_millis(250)),
            concurrency: Some(5),
        }),
        retry: Some(RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: false,
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(30))
    }
}

/// Background job status polling
///
/// - Poll every 2s for up to 5 minutes
pub fn background_job_config() -> TaskConfig {
    TaskConfig {
        poll: Some(PollConfig {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(10))
    }
}

/// Weather lookups
///
/// - Cache TTL: 10 minutes
/// - Retry: 2 attempts
pub fn weather_lookup_config() -> TaskConfig {
    TaskConfig {
        cache_ttl: Some(Duration::from_secs(600)),
        retry: Some(RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }),
        ..TaskConfig::with_timeout(Duration::from_secs(8))
    }
}
