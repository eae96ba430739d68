/// Turn failures into values instead of propagating them
///
/// `try_async` wraps a single operation, `settle_all` waits for a whole set
/// without short-circuiting on the first failure.
use futures_util::future::{join_all, FutureExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::debug;

/// How a settled operation failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure<E> {
    /// The operation returned `Err`
    #[error("{0}")]
    Error(E),
    /// The operation panicked; holds the panic message when it was a string
    #[error("Operation panicked: {0}")]
    Panic(String),
}

impl<E> Failure<E> {
    pub fn into_error(self) -> Option<E> {
        match self {
            Failure::Error(e) => Some(e),
            Failure::Panic(_) => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Failure::Panic(_))
    }
}

pub type Settled<T, E> = Result<T, Failure<E>>;

/// Await `future` once and capture its outcome. Never panics.
pub async fn try_async<F, T, E>(future: F) -> Settled<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Failure::Error(e)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug!("Captured panic from settled operation: {}", message);
            Err(Failure::Panic(message))
        }
    }
}

/// Await every future and return one outcome per input, in input order.
pub async fn settle_all<I, F, T, E>(futures: I) -> Vec<Settled<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    join_all(futures.into_iter().map(try_async)).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_success_is_ok() {
        let result = try_async(async { Ok::<_, String>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_error_is_captured() {
        let result = try_async(async { Err::<u32, _>("network down") }).await;
        assert_eq!(result, Err(Failure::Error("network down")));
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let result: Settled<u32, String> = try_async(async {
            if true {
                panic!("unexpected payload");
            }
            Ok(1)
        })
        .await;

        let failure = result.unwrap_err();
        assert!(failure.is_panic());
        assert_eq!(failure, Failure::Panic("unexpected payload".to_string()));
    }

    #[tokio::test]
    async fn test_already_running_task_handle() {
        let handle = tokio::spawn(async { 5 });
        let result = try_async(handle).await;
        assert_eq!(result.map_err(|f| f.is_panic()), Ok(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_all_preserves_order() {
        let futures: Vec<std::pin::Pin<Box<dyn Future<Output = Result<&str, String>>>>> = vec![
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, String>("a")
            }),
            Box::pin(async { Err::<&str, _>("boom".to_string()) }),
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, String>("b")
            }),
        ];

        let results = settle_all(futures).await;

        assert_eq!(
            results,
            vec![
                Ok("a"),
                Err(Failure::Error("boom".to_string())),
                Ok("b")
            ]
        );
    }

    #[tokio::test]
    async fn test_settle_all_empty() {
        let results = settle_all(Vec::<std::future::Ready<Result<u8, String>>>::new()).await;
        assert!(results.is_empty());
    }
}
