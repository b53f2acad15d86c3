// src/core/scheduler.rs

use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Default width of the worker pool.
pub const DEFAULT_WORKERS: usize = 10;

/// Runs every work item with at most `width` in flight and returns the
/// successful results in completion order.
///
/// Each item runs in its own task, so an item that errors or panics is logged
/// and dropped while the others carry on. `on_progress(completed, total)` fires
/// after every item, failed ones included.
pub async fn run_bounded<I, T, E, F, Fut, P>(
    items: Vec<I>,
    width: usize,
    work: F,
    mut on_progress: P,
) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    P: FnMut(usize, usize),
{
    let total = items.len();
    let width = width.max(1);
    debug!(total, width, "Dispatching work items.");

    let mut completions = stream::iter(items)
        .map(|item| tokio::spawn(work(item)))
        .buffer_unordered(width);

    let mut results = Vec::with_capacity(total);
    let mut completed = 0;
    while let Some(joined) = completions.next().await {
        completed += 1;
        match joined {
            Ok(Ok(value)) => results.push(value),
            Ok(Err(e)) => warn!(error = %e, "Work item failed, dropping it."),
            Err(e) => warn!(error = %e, "Work item aborted, dropping it."),
        }
        on_progress(completed, total);
    }
    results
}

/// Maps `completed / total` onto the `[start, start + span]` progress band.
pub fn band_progress(start: u8, span: u8, completed: usize, total: usize) -> u8 {
    if total == 0 {
        return start.saturating_add(span);
    }
    let filled = (span as usize * completed.min(total)) / total;
    start.saturating_add(filled as u8)
}
