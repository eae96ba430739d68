//! Async task helpers for flaky network calls
//!
//! This library provides small, composable building blocks:
//! - **Retry**: Deterministic exponential backoff, surfacing the last error
//! - **Timeout**: Deadline races with a dedicated timeout error
//! - **Pool**: Bounded-concurrency and sequential mapping, order preserved
//! - **Batch**: Fixed-size batches with an optional pause between them
//! - **Debounce / Throttle**: Rate shaping for search inputs and saves
//! - **Poll**: Repeat an operation until a condition holds
//! - **Cache**: TTL memoization per distinct argument
//! - **Settle**: Failures as values, for one operation or a whole set
//! - **Preset Configurations**: Pre-tuned settings for common call sites
//!
//! # Example: API request with timeout and retry
//!
//! ```rust,no_run
//! use task_toolkit::{presets, with_retry, with_timeout_result};
//!
//! # async fn fetch_listing() -> Result<String, String> { Ok(String::new()) }
//! #[tokio::main]
//! async fn main() {
//!     let config = presets::api_request_config();
//!
//!     let result = with_retry(config.retry.unwrap_or_default(), || {
//!         with_timeout_result(config.timeout.duration, fetch_listing())
//!     })
//!     .await;
//! }
//! ```
//!
//! # Example: Fetch many records, at most 5 at a time
//!
//! ```rust,no_run
//! use task_toolkit::map_concurrent;
//!
//! # async fn fetch_sale(id: u64) -> Result<String, String> { Ok(id.to_string()) }
//! #[tokio::main]
//! async fn main() {
//!     let ids = vec![11, 12, 13, 14, 15, 16];
//!     let sales = map_concurrent(ids, 5, |id, _| fetch_sale(id)).await;
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod metrics;
pub mod poll;
pub mod pool;
pub mod presets;
pub mod retry;
pub mod settle;
pub mod throttle;
pub mod timeout;

// Re-export main types for convenience
pub use batch::{run_batches, BatchConfig};
pub use cache::{stable_key, CacheEntry, Memoized, TtlCache};
pub use config::{ConfigError, ToolkitSettings};
pub use debounce::{DebounceError, Debouncer};
pub use poll::{poll_until, poll_until_notify, PollConfig, PollError};
pub use pool::{map_concurrent, map_sequential};
pub use presets::{
    api_request_config, autosave_config, background_job_config, form_submission_config,
    listing_fetch_config, search_input_config, weather_lookup_config, TaskConfig,
};
pub use retry::{with_retry, with_retry_notify, RetryConfig};
pub use settle::{settle_all, try_async, Failure, Settled};
pub use throttle::{Throttled, Throttler};
pub use timeout::{
    with_timeout, with_timeout_config, with_timeout_result, TimeoutConfig, TimeoutError,
};
