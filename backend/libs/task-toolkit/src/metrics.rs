/// Prometheus metrics for task helpers
#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;

#[cfg(feature = "metrics")]
static TIMEOUT_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "task_toolkit_timeout_operations_total",
        "Total number of timeout-guarded operations",
        &["result"]
    )
    .expect("Failed to register timeout operations metric")
});

#[cfg(feature = "metrics")]
static RETRY_ATTEMPTS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "task_toolkit_retry_attempts",
        "Number of attempts before success or failure",
        &["result"]
    )
    .expect("Failed to register retry attempts metric")
});

#[cfg(feature = "metrics")]
static DEBOUNCE_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "task_toolkit_debounce_calls_total",
        "Debounced calls by outcome",
        &["outcome"]
    )
    .expect("Failed to register debounce calls metric")
});

#[cfg(feature = "metrics")]
static THROTTLE_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "task_toolkit_throttle_calls_total",
        "Throttled calls by outcome",
        &["outcome"]
    )
    .expect("Failed to register throttle calls metric")
});

#[cfg(feature = "metrics")]
static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "task_toolkit_cache_lookups_total",
        "TTL cache lookups by result",
        &["result"]
    )
    .expect("Failed to register cache lookups metric")
});

#[cfg(feature = "metrics")]
static POLL_ATTEMPTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "task_toolkit_poll_attempts_total",
        "Total number of poll attempts"
    )
    .expect("Failed to register poll attempts metric")
});

/// Metrics collector for timeouts
#[cfg(feature = "metrics")]
pub struct TimeoutMetrics;

#[cfg(feature = "metrics")]
impl TimeoutMetrics {
    pub fn record_operation(result: &str) {
        TIMEOUT_OPERATIONS.with_label_values(&[result]).inc();
    }
}

/// Metrics collector for retries
#[cfg(feature = "metrics")]
pub struct RetryMetrics;

#[cfg(feature = "metrics")]
impl RetryMetrics {
    pub fn record_attempts(result: &str, attempts: u32) {
        RETRY_ATTEMPTS
            .with_label_values(&[result])
            .observe(attempts as f64);
    }
}

#[cfg(feature = "metrics")]
pub struct DebounceMetrics;

#[cfg(feature = "metrics")]
impl DebounceMetrics {
    pub fn record_cancelled() {
        DEBOUNCE_CALLS.with_label_values(&["cancelled"]).inc();
    }

    pub fn record_executed() {
        DEBOUNCE_CALLS.with_label_values(&["executed"]).inc();
    }
}

#[cfg(feature = "metrics")]
pub struct ThrottleMetrics;

#[cfg(feature = "metrics")]
impl ThrottleMetrics {
    pub fn record_suppressed() {
        THROTTLE_CALLS.with_label_values(&["suppressed"]).inc();
    }

    pub fn record_executed() {
        THROTTLE_CALLS.with_label_values(&["executed"]).inc();
    }
}

#[cfg(feature = "metrics")]
pub struct CacheMetrics;

#[cfg(feature = "metrics")]
impl CacheMetrics {
    pub fn record_hit() {
        CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
    }

    pub fn record_miss() {
        CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
    }
}

#[cfg(feature = "metrics")]
pub struct PollMetrics;

#[cfg(feature = "metrics")]
impl PollMetrics {
    pub fn record_attempt() {
        POLL_ATTEMPTS.inc();
    }
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub struct TimeoutMetrics;

#[cfg(not(feature = "metrics"))]
impl TimeoutMetrics {
    pub fn record_operation(_result: &str) {}
}

#[cfg(not(feature = "metrics"))]
pub struct RetryMetrics;

#[cfg(not(feature = "metrics"))]
impl RetryMetrics {
    pub fn record_attempts(_result: &str, _attempts: u32) {}
}

#[cfg(not(feature = "metrics"))]
pub struct DebounceMetrics;

#[cfg(not(feature = "metrics"))]
impl DebounceMetrics {
    pub fn record_cancelled() {}
    pub fn record_executed() {}
}

#[cfg(not(feature = "metrics"))]
pub struct ThrottleMetrics;

#[cfg(not(feature = "metrics"))]
impl ThrottleMetrics {
    pub fn record_suppressed() {}
    pub fn record_executed() {}
}

#[cfg(not(feature = "metrics"))]
pub struct CacheMetrics;

#[cfg(not(feature = "metrics"))]
impl CacheMetrics {
    pub fn record_hit() {}
    pub fn record_miss() {}
}

#[cfg(not(feature = "metrics"))]
pub struct PollMetrics;

#[cfg(not(feature = "metrics"))]
impl PollMetrics {
    pub fn record_attempt() {}
}
