//! Concurrent fan-out of one request per input, joined back in input order.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::task::JoinSet;

/// What a batch does when one of its requests fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinPolicy {
    /// The first failure aborts the remaining requests and discards every result.
    #[default]
    FailFast,
    /// Failed requests are dropped; successes are kept in input order.
    SkipFailed,
}

/// Result of a whole batch.
#[derive(Debug)]
pub enum BatchOutcome<T> {
    Success(Vec<T>),
    /// Only produced under [`JoinPolicy::SkipFailed`]. `failure` is the last
    /// failure observed.
    Partial { items: Vec<T>, failure: anyhow::Error },
    Failure(anyhow::Error),
}

/// Spawn `task(input)` for every input and wait for all of them.
///
/// Must be called from within a tokio runtime. Results keep the order of
/// `inputs` regardless of completion order.
pub async fn run_batch<I, T, F, Fut>(inputs: Vec<I>, policy: JoinPolicy, task: F) -> BatchOutcome<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let total = inputs.len();
    let mut set = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let fut = task(input);
        set.spawn(async move { (index, fut.await) });
    }

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut last_failure = None;

    while let Some(joined) = set.join_next().await {
        let failure = match joined {
            Ok((index, Ok(item))) => {
                slots[index] = Some(item);
                continue;
            }
            Ok((index, Err(err))) => {
                tracing::debug!(index, error = %format!("{err:#}"), "batch request failed");
                err
            }
            Err(join_err) => anyhow::anyhow!("batch request task did not complete: {join_err}"),
        };

        match policy {
            JoinPolicy::FailFast => {
                set.abort_all();
                return BatchOutcome::Failure(failure);
            }
            JoinPolicy::SkipFailed => last_failure = Some(failure),
        }
    }

    let items: Vec<T> = slots.into_iter().flatten().collect();

    match last_failure {
        None => BatchOutcome::Success(items),
        Some(failure) if items.is_empty() => BatchOutcome::Failure(failure),
        Some(failure) => BatchOutcome::Partial { items, failure },
    }
}
