/// Bounded-concurrency and sequential mapping over a collection
///
/// Both runners return results in input order and fail fast: the first
/// error is returned as soon as it is observed and any futures still in
/// flight are dropped.
use futures_util::pin_mut;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use tracing::{debug, warn};

/// Run `f(item, index)` over `items` with at most `limit` calls in flight.
///
/// `output[i]` is the result for `items[i]` no matter which call finishes
/// first. A `limit` of 0 is treated as 1.
pub async fn map_concurrent<I, T, R, E, F, Fut>(
    items: I,
    limit: usize,
    mut f: F,
) -> Result<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let limit = if limit == 0 {
        warn!("Concurrency limit of 0 requested, using 1");
        1
    } else {
        limit
    };

    let tasks: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    let total = tasks.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    debug!("Running {} tasks with concurrency limit {}", total, limit);

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();

    let completed = stream::iter(tasks.into_iter().map(|(index, item)| {
        let fut = f(item, index);
        async move { fut.await.map(|value| (index, value)) }
    }))
    .buffer_unordered(limit);
    pin_mut!(completed);

    while let Some((index, value)) = completed.try_next().await? {
        slots[index] = Some(value);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Run `f(item, index)` over `items` one at a time.
///
/// Call `i + 1` is not started until call `i` has completed.
pub async fn map_sequential<I, T, R, E, F, Fut>(items: I, mut f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let items = items.into_iter();
    let mut results = Vec::with_capacity(items.size_hint().0);

    for (index, item) in items.enumerate() {
        results.push(f(item, index).await?);
    }

    Ok(results)
}
