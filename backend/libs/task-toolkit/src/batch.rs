/// Fixed-size batch execution with an optional pause between batches
use crate::pool::map_concurrent;
use futures_util::future::try_join_all;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Items per batch; 0 is treated as 1
    pub batch_size: usize,
    /// Pause after each batch except the last
    pub delay_between_batches: Option<Duration>,
    /// Bound concurrency inside a batch; `None` runs the whole batch at once
    pub concurrency: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delay_between_batches: None,
            concurrency: None,
        }
    }
}

impl BatchConfig {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Default::default()
        }
    }
}

/// Run `f(item, index)` over `items` in consecutive batches.
///
/// Each batch completes before the next one starts. `index` is the item's
/// position in the original input, and results keep that order.
pub async fn run_batches<I, T, R, E, F, Fut>(
    items: I,
    config: &BatchConfig,
    mut f: F,
) -> Result<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let batch_size = config.batch_size.max(1);
    let mut pending = items.into_iter().enumerate().peekable();
    let mut results = Vec::with_capacity(pending.size_hint().0);
    let mut batch_number = 0;

    while pending.peek().is_some() {
        batch_number += 1;
        let batch: Vec<(usize, T)> = pending.by_ref().take(batch_size).collect();
        debug!("Starting batch {} ({} items)", batch_number, batch.len());

        let batch_results = match config.concurrency {
            Some(limit) => {
                map_concurrent(batch, limit, |(index, item), _| f(item, index)).await?
            }
            None => try_join_all(batch.into_iter().map(|(index, item)| f(item, index))).await?,
        };
        results.extend(batch_results);

        if pending.peek().is_some() {
            if let Some(delay) = config.delay_between_batches {
                tokio::time::sleep(delay).await;
            }
        }
    }

    Ok(results)
}
