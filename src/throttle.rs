//! Bounded-concurrency request scheduling.
//!
//! The Admin API rate-limits aggressively, so multi-item helpers run their
//! requests in throttled waves: a batch of tasks is launched concurrently,
//! every task is allowed to settle, and a fixed delay separates one batch
//! from the next. Concurrency here means multiple in-flight requests
//! multiplexed on the async runtime, not parallel threads.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

/// Runs `task` over `items` in batches of at most `concurrency`.
///
/// Items are drained from the **end** of the input list, so the last item
/// is attempted first; callers must not rely on result order beyond "one
/// result per input". Within a batch all tasks run concurrently and every
/// one settles before the next batch starts; a rejected task never
/// cancels its batch mates. `delay` elapses between batches and is skipped
/// entirely when zero.
///
/// Each input's settled outcome is returned as its own `Result`; the call
/// itself never fails.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use shopify_bulk::throttle::{throttle, fulfilled};
///
/// # tokio_test::block_on(async {
/// let results = throttle(
///     |n: u32| async move {
///         if n % 2 == 0 {
///             Ok(n * 10)
///         } else {
///             Err("odd")
///         }
///     },
///     vec![1, 2, 3, 4],
///     2,
///     Duration::ZERO,
/// )
/// .await;
///
/// assert_eq!(results.len(), 4);
/// let mut values = fulfilled(results);
/// values.sort_unstable();
/// assert_eq!(values, vec![20, 40]);
/// # });
/// ```
pub async fn throttle<I, T, E, F, Fut>(
    task: F,
    items: Vec<I>,
    concurrency: usize,
    delay: Duration,
) -> Vec<Result<T, E>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let concurrency = concurrency.max(1);
    let mut queue = items;
    let mut results = Vec::with_capacity(queue.len());

    while !queue.is_empty() {
        let mut batch = Vec::with_capacity(concurrency);
        while batch.len() < concurrency {
            match queue.pop() {
                Some(item) => batch.push(item),
                None => break,
            }
        }

        let settled = join_all(batch.into_iter().map(&task)).await;
        results.extend(settled);

        if delay.is_zero() || queue.is_empty() {
            continue;
        }

        tokio::time::sleep(delay).await;
    }

    results
}

/// Keeps only the fulfilled results.
pub fn fulfilled<T, E>(results: Vec<Result<T, E>>) -> Vec<T> {
    results.into_iter().filter_map(Result::ok).collect()
}
