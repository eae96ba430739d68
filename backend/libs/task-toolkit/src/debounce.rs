/// Debouncer: only the last call of a burst runs
use crate::metrics::DebounceMetrics;
use parking_lot::Mutex;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebounceError<E> {
    #[error("Debounced call was superseded before it ran")]
    Cancelled,
    #[error("Debounced operation failed: {0}")]
    Operation(E),
}

impl<E> DebounceError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DebounceError::Cancelled)
    }
}

struct DebounceState {
    /// Bumped by every invoke and every cancel; a waiting call only runs if
    /// it still owns the current generation.
    generation: u64,
    pending: Option<oneshot::Sender<()>>,
}

struct Inner<F> {
    delay: Duration,
    f: F,
    state: Mutex<DebounceState>,
}

/// Each `invoke` waits for `delay` of quiet time. A newer `invoke` arriving
/// before that cancels the waiting one, whose caller gets
/// [`DebounceError::Cancelled`]. Once a call has started executing it can no
/// longer be superseded.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use task_toolkit::Debouncer;
///
/// # async fn search(q: String) -> Result<Vec<String>, String> { Ok(vec![q]) }
/// # async fn example() {
/// let debounced = Debouncer::new(Duration::from_millis(300), search);
/// let results = debounced.invoke("wellington".to_string()).await;
/// # }
/// ```
pub struct Debouncer<A, F> {
    inner: Arc<Inner<F>>,
    _args: PhantomData<fn(A)>,
}

impl<A, F> Clone for Debouncer<A, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _args: PhantomData,
        }
    }
}

impl<A, F, Fut, T, E> Debouncer<A, F>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    pub fn new(delay: Duration, f: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay,
                f,
                state: Mutex::new(DebounceState {
                    generation: 0,
                    pending: None,
                }),
            }),
            _args: PhantomData,
        }
    }

    pub async fn invoke(&self, args: A) -> Result<T, DebounceError<E>> {
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let generation = {
            let mut state = self.inner.state.lock();
            if let Some(previous) = state.pending.replace(cancel_tx) {
                if previous.send(()).is_ok() {
                    debug!("Superseded pending debounced call");
                    DebounceMetrics::record_cancelled();
                }
            }
            state.generation += 1;
            state.generation
        };

        tokio::select! {
            _ = tokio::time::sleep(self.inner.delay) => {}
            _ = cancel_rx => return Err(DebounceError::Cancelled),
        }

        {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                return Err(DebounceError::Cancelled);
            }
            state.pending = None;
        }

        DebounceMetrics::record_executed();
        (self.inner.f)(args).await.map_err(DebounceError::Operation)
    }
}

impl<A, F> Debouncer<A, F> {
    /// Cancel the waiting call, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        match state.pending.take() {
            Some(pending) => {
                let cancelled = pending.send(()).is_ok();
                if cancelled {
                    DebounceMetrics::record_cancelled();
                }
                cancelled
            }
            None => false,
        }
    }

    /// Whether a call is currently waiting out its quiet period
    pub fn is_pending(&self) -> bool {
        self.inner
            .state
            .lock()
            .pending
            .as_ref()
            .is_some_and(|pending| !pending.is_closed())
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_debouncer(
        delay: Duration,
    ) -> (
        Debouncer<String, impl Fn(String) -> std::future::Ready<Result<String, String>>>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_clone = calls.clone();
        let debouncer = Debouncer::new(delay, move |arg: String| {
            calls_clone.lock().push(arg.clone());
            std::future::ready(Ok(format!("result:{}", arg)))
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_in_burst_runs() {
        let (debouncer, calls) = recording_debouncer(Duration::from_millis(100));

        let (r1, r2, r3) = tokio::join!(
            debouncer.invoke("call1".to_string()),
            debouncer.invoke("call2".to_string()),
            debouncer.invoke("call3".to_string()),
        );

        assert_eq!(r1, Err(DebounceError::Cancelled));
        assert_eq!(r2, Err(DebounceError::Cancelled));
        assert_eq!(r3, Ok("result:call3".to_string()));
        assert_eq!(*calls.lock(), vec!["call3".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_separated_by_quiet_period_both_run() {
        let (debouncer, calls) = recording_debouncer(Duration::from_millis(100));

        assert!(debouncer.invoke("first".to_string()).await.is_ok());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(debouncer.invoke("second".to_string()).await.is_ok());

        assert_eq!(*calls.lock(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_call_restarts_window() {
        let (debouncer, calls) = recording_debouncer(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        let first = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.invoke("early".to_string()).await }
        });
        tokio::time::sleep(Duration::from_millis(60)).await;
        let second = debouncer.invoke("late".to_string()).await;

        assert!(first.await.unwrap().unwrap_err().is_cancelled());
        assert_eq!(second.unwrap(), "result:late");
        // 60ms before the second call, then a full 100ms window
        assert!(start.elapsed() >= Duration::from_millis(160));
        assert_eq!(*calls.lock(), vec!["late".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_call() {
        let (debouncer, calls) = recording_debouncer(Duration::from_millis(100));

        let waiting = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.invoke("abandoned".to_string()).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());

        assert_eq!(waiting.await.unwrap(), Err(DebounceError::Cancelled));
        assert!(calls.lock().is_empty());
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_reaches_caller() {
        let debouncer = Debouncer::new(Duration::from_millis(20), |id: u32| async move {
            Err::<(), _>(format!("save {} failed", id))
        });

        let result = debouncer.invoke(7).await;
        assert_eq!(result, Err(DebounceError::Operation("save 7 failed".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_do_not_share_state() {
        let (a, a_calls) = recording_debouncer(Duration::from_millis(50));
        let (b, b_calls) = recording_debouncer(Duration::from_millis(50));

        let (ra, rb) = tokio::join!(a.invoke("a".to_string()), b.invoke("b".to_string()));

        assert!(ra.is_ok());
        assert!(rb.is_ok());
        assert_eq!(a_calls.lock().len(), 1);
        assert_eq!(b_calls.lock().len(), 1);
    }
}
