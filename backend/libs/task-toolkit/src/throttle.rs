/// Throttler: at most one execution per cooldown window
use crate::metrics::ThrottleMetrics;
use parking_lot::Mutex;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of a throttled call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Throttled<T> {
    /// The operation ran and produced this value
    Executed(T),
    /// The call landed inside the cooldown window and was dropped
    Suppressed,
}

impl<T> Throttled<T> {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Throttled::Suppressed)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Throttled::Executed(value) => Some(value),
            Throttled::Suppressed => None,
        }
    }
}

struct Inner<F> {
    cooldown: Duration,
    f: F,
    last_invoked: Mutex<Option<Instant>>,
}

pub struct Throttler<A, F> {
    inner: Arc<Inner<F>>,
    _args: PhantomData<fn(A)>,
}

impl<A, F> Clone for Throttler<A, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _args: PhantomData,
        }
    }
}

impl<A, F, Fut, T, E> Throttler<A, F>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    pub fn new(cooldown: Duration, f: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                cooldown,
                f,
                last_invoked: Mutex::new(None),
            }),
            _args: PhantomData,
        }
    }

    /// Run the operation unless the previous execution started less than
    /// `cooldown` ago, in which case return [`Throttled::Suppressed`] at once.
    pub async fn invoke(&self, args: A) -> Result<Throttled<T>, E> {
        let now = Instant::now();

        {
            let mut last_invoked = self.inner.last_invoked.lock();
            if let Some(previous) = *last_invoked {
                let since = now.saturating_duration_since(previous);
                if since < self.inner.cooldown {
                    debug!(
                        "Throttled call suppressed ({:?} left in cooldown)",
                        self.inner.cooldown - since
                    );
                    ThrottleMetrics::record_suppressed();
                    return Ok(Throttled::Suppressed);
                }
            }
            *last_invoked = Some(now);
        }

        ThrottleMetrics::record_executed();
        (self.inner.f)(args).await.map(Throttled::Executed)
    }
}

impl<A, F> Throttler<A, F> {
    /// Forget the last execution so the next call runs immediately
    pub fn reset(&self) {
        *self.inner.last_invoked.lock() = None;
    }

    pub fn cooldown(&self) -> Duration {
        self.inner.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_throttler(
        cooldown: Duration,
    ) -> (
        Throttler<u32, impl Fn(u32) -> std::future::Ready<Result<u32, String>>>,
        Arc<AtomicU32>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let throttler = Throttler::new(cooldown, move |n: u32| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(n * 10))
        });
        (throttler, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls() {
        let (throttler, calls) = counting_throttler(Duration::from_millis(100));

        let first = throttler.invoke(1).await.unwrap();
        let second = throttler.invoke(2).await.unwrap();

        assert_eq!(first, Throttled::Executed(10));
        assert_eq!(second, Throttled::Suppressed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_executes_again_after_cooldown() {
        let (throttler, calls) = counting_throttler(Duration::from_millis(100));

        assert_eq!(throttler.invoke(1).await.unwrap(), Throttled::Executed(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(throttler.invoke(2).await.unwrap().is_suppressed());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(throttler.invoke(3).await.unwrap(), Throttled::Executed(30));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_window() {
        let (throttler, calls) = counting_throttler(Duration::from_secs(60));

        let _ = throttler.invoke(1).await;
        throttler.reset();
        assert_eq!(throttler.invoke(2).await.unwrap().into_option(), Some(20));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_propagates_and_still_starts_window() {
        let throttler = Throttler::new(Duration::from_secs(1), |_: ()| async {
            Err::<(), _>("rate limited upstream")
        });

        assert_eq!(throttler.invoke(()).await, Err("rate limited upstream"));
        assert_eq!(throttler.invoke(()).await, Ok(Throttled::Suppressed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_window() {
        let (throttler, calls) = counting_throttler(Duration::from_millis(100));
        let other = throttler.clone();

        assert!(!throttler.invoke(1).await.unwrap().is_suppressed());
        assert!(other.invoke(2).await.unwrap().is_suppressed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
