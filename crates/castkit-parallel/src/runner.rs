//! Bounded-concurrency runner
//!
//! Every entry point enumerates its source once, then drives one future
//! per item through a [`FuturesUnordered`] set. Each future first acquires
//! a permit from a semaphore sized to `max_parallel`, so at most that many
//! operations are in flight. A permit travels back with the item's outcome
//! and is dropped only after the completion callback (or result slot write)
//! for that item has run.
//!
//! Failures never cancel siblings. Callbacks are fallible and their errors
//! count as failures of the item. The first failure in completion order is
//! reported; later failures are logged and counted.

use crate::config::{check_max_parallel, CancellationFlag, RunnerConfig};
use crate::error::RunError;
use futures::future::{self, Ready, TryJoin};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;
use tokio::sync::{Semaphore, SemaphorePermit};

/// How an admitted item settled
enum Outcome<R, E> {
    Done(R),
    Failed(E),
    Skipped,
}

/// First failure in completion order plus a count of the rest
struct FirstFailure<E> {
    first: Option<(usize, E)>,
    suppressed: usize,
}

impl<E: Display> FirstFailure<E> {
    fn new() -> Self {
        Self {
            first: None,
            suppressed: 0,
        }
    }

    fn record(&mut self, index: usize, error: E, stage: &'static str) {
        if self.first.is_none() {
            tracing::debug!(index, stage, error = %error, "item failed");
            self.first = Some((index, error));
        } else {
            self.suppressed += 1;
            tracing::warn!(index, stage, error = %error, "suppressed failure");
        }
    }
}

/// Run `op` over `items` and hand each success to `sink(index, result)`
///
/// A sink error fails the item the same way an operation error does.
async fn drive<T, R, E, F, Fut, S>(
    items: Vec<T>,
    op: F,
    max_parallel: usize,
    cancellation: Option<&CancellationFlag>,
    mut sink: S,
) -> Result<(), RunError<E>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
    S: FnMut(usize, R) -> Result<(), E>,
{
    let limit = check_max_parallel(max_parallel)?;
    let total = items.len();
    tracing::debug!(items = total, max_parallel = limit, "run started");

    let semaphore = Semaphore::new(limit);
    let semaphore = &semaphore;
    let op = &op;

    let mut pending: FuturesUnordered<_> = items
        .into_iter()
        .enumerate()
        .map(move |(index, item)| async move {
            let Ok(permit) = semaphore.acquire().await else {
                return (index, Outcome::Skipped, None);
            };
            if cancellation.is_some_and(CancellationFlag::is_cancelled) {
                return (index, Outcome::Skipped, Some(permit));
            }
            let outcome = match op(item).await {
                Ok(value) => Outcome::Done(value),
                Err(error) => Outcome::Failed(error),
            };
            (index, outcome, Some(permit))
        })
        .collect();

    let mut completed = 0usize;
    let mut skipped = 0usize;
    let mut failures = FirstFailure::new();

    while let Some((index, outcome, permit)) = pending.next().await {
        let _permit: Option<SemaphorePermit<'_>> = permit;
        match outcome {
            Outcome::Done(value) => match sink(index, value) {
                Ok(()) => completed += 1,
                Err(error) => failures.record(index, error, "callback"),
            },
            Outcome::Failed(error) => failures.record(index, error, "operation"),
            Outcome::Skipped => {
                if skipped == 0 {
                    tracing::warn!(index, completed, "run cancelled, skipping remaining items");
                }
                skipped += 1;
            }
        }
    }

    let FirstFailure { first, suppressed } = failures;
    tracing::debug!(
        items = total,
        completed,
        failed = usize::from(first.is_some()) + suppressed,
        skipped,
        "run finished"
    );

    if let Some((index, error)) = first {
        return Err(RunError::Operation {
            index,
            error,
            completed,
            suppressed,
        });
    }
    if skipped > 0 {
        return Err(RunError::Cancelled { completed });
    }
    Ok(())
}

async fn run_ordered<T, R, E, F, Fut>(
    items: Vec<T>,
    op: F,
    max_parallel: usize,
    cancellation: Option<&CancellationFlag>,
) -> Result<Vec<R>, RunError<E>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    drive(items, op, max_parallel, cancellation, |index, value| {
        slots[index] = Some(value);
        Ok(())
    })
    .await?;
    Ok(slots.into_iter().flatten().collect())
}

/// Pair each result with a clone of the item it was produced from
fn keep_item<T, R, E, F, Fut>(op: F) -> impl Fn(T) -> TryJoin<Ready<Result<T, E>>, Fut>
where
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    move |item: T| future::try_join(future::ready(Ok(item.clone())), op(item))
}

/// Apply `op` to every item with at most `max_parallel` in flight
///
/// Results are discarded. Completes once every admitted operation settled.
///
/// # Errors
/// - `RunError::InvalidArgument` if `max_parallel` is zero, before any
///   operation starts
/// - `RunError::Operation` if any operation (or callback, for the `_with`
///   variants) failed
pub async fn for_each_async<I, T, R, E, F, Fut>(
    source: I,
    op: F,
    max_parallel: usize,
) -> Result<(), RunError<E>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    drive(source.into_iter().collect(), op, max_parallel, None, |_, _| Ok(())).await
}

/// Like [`for_each_async`], calling `on_done(item)` after each success
///
/// The callback runs while the item's permit is still held. An `Err` from
/// the callback fails that item without affecting the others.
///
/// # Errors
/// See [`for_each_async`]
pub async fn for_each_async_with<I, T, R, E, F, Fut, D>(
    source: I,
    op: F,
    mut on_done: D,
    max_parallel: usize,
) -> Result<(), RunError<E>>
where
    I: IntoIterator<Item = T>,
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
    D: FnMut(T) -> Result<(), E>,
{
    drive(
        source.into_iter().collect(),
        keep_item(op),
        max_parallel,
        None,
        |_, (item, _)| on_done(item),
    )
    .await
}

/// Like [`for_each_async`], calling `on_done(item, result)` after each success
///
/// The callback runs while the item's permit is still held. An `Err` from
/// the callback fails that item without affecting the others.
///
/// # Errors
/// See [`for_each_async`]
pub async fn for_each_async_with_result<I, T, R, E, F, Fut, D>(
    source: I,
    op: F,
    mut on_done: D,
    max_parallel: usize,
) -> Result<(), RunError<E>>
where
    I: IntoIterator<Item = T>,
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
    D: FnMut(T, R) -> Result<(), E>,
{
    drive(
        source.into_iter().collect(),
        keep_item(op),
        max_parallel,
        None,
        |_, (item, value)| on_done(item, value),
    )
    .await
}

/// Apply `op` to every item and return the results in source order
///
/// Source order is the enumeration order of `source`, independent of the
/// order in which operations complete.
///
/// # Example
///
/// ```rust
/// # tokio_test_block(async {
/// use castkit_parallel::for_each_ordered;
///
/// let out = for_each_ordered(0..3, |x| async move { Ok::<_, String>(x.to_string()) }, 2)
///     .await
///     .unwrap();
/// assert_eq!(out, vec!["0", "1", "2"]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
///
/// # Errors
/// See [`for_each_async`]
pub async fn for_each_ordered<I, T, R, E, F, Fut>(
    source: I,
    op: F,
    max_parallel: usize,
) -> Result<Vec<R>, RunError<E>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    run_ordered(source.into_iter().collect(), op, max_parallel, None).await
}

/// Runner bound to a [`RunnerConfig`]
///
/// Uses the configured admission limit and, when present, the configured
/// cancellation flag for every run.
#[derive(Debug, Clone, Default)]
pub struct ParallelRunner {
    config: RunnerConfig,
}

impl ParallelRunner {
    /// Create runner
    #[inline]
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Request cancellation of runs using this runner's flag
    ///
    /// Returns `false` when no flag is configured.
    pub fn cancel(&self) -> bool {
        match &self.config.cancellation {
            Some(flag) => {
                flag.cancel();
                true
            }
            None => false,
        }
    }

    /// Unordered run, results discarded
    ///
    /// # Errors
    /// See [`for_each_async`]; also `RunError::Cancelled`
    pub async fn run_each<I, T, R, E, F, Fut>(&self, source: I, op: F) -> Result<(), RunError<E>>
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        drive(
            source.into_iter().collect(),
            op,
            self.config.max_parallel,
            self.config.cancellation.as_ref(),
            |_, _| Ok(()),
        )
        .await
    }

    /// Unordered run with `on_done(item)` per success
    ///
    /// # Errors
    /// See [`for_each_async`]; also `RunError::Cancelled`
    pub async fn run_each_with<I, T, R, E, F, Fut, D>(
        &self,
        source: I,
        op: F,
        mut on_done: D,
    ) -> Result<(), RunError<E>>
    where
        I: IntoIterator<Item = T>,
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
        D: FnMut(T) -> Result<(), E>,
    {
        drive(
            source.into_iter().collect(),
            keep_item(op),
            self.config.max_parallel,
            self.config.cancellation.as_ref(),
            |_, (item, _)| on_done(item),
        )
        .await
    }

    /// Unordered run with `on_done(item, result)` per success
    ///
    /// # Errors
    /// See [`for_each_async`]; also `RunError::Cancelled`
    pub async fn run_each_with_result<I, T, R, E, F, Fut, D>(
        &self,
        source: I,
        op: F,
        mut on_done: D,
    ) -> Result<(), RunError<E>>
    where
        I: IntoIterator<Item = T>,
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
        D: FnMut(T, R) -> Result<(), E>,
    {
        drive(
            source.into_iter().collect(),
            keep_item(op),
            self.config.max_parallel,
            self.config.cancellation.as_ref(),
            |_, (item, value)| on_done(item, value),
        )
        .await
    }

    /// Ordered run
    ///
    /// # Errors
    /// See [`for_each_async`]; also `RunError::Cancelled`
    pub async fn run_ordered<I, T, R, E, F, Fut>(
        &self,
        source: I,
        op: F,
    ) -> Result<Vec<R>, RunError<E>>
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
    {
        run_ordered(
            source.into_iter().collect(),
            op,
            self.config.max_parallel,
            self.config.cancellation.as_ref(),
        )
        .await
    }
}
