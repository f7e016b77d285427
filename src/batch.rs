//! Bounded batch execution.
//!
//! [`run_bounded`] drives a sliding window of at most `limit` futures on the
//! caller's task. As soon as one unit completes the next one is admitted, so
//! a slow unit never holds back the rest of the window. Every result is
//! written to the slot of its input index, which keeps output order equal to
//! input order whatever the completion order was.

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::types::BatchOutcome;

/// Run `f` over `items` with at most `limit` calls in flight.
///
/// `limit` is clamped to at least 1. No unit is retried or cancelled; a
/// failing unit simply reports its own `Err` in its slot.
pub async fn run_bounded<I, T, F, Fut>(items: I, limit: usize, mut f: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    let completed = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let unit = f(item);
            async move { (index, unit.await) }
        })
        .buffer_unordered(limit.max(1));
    let mut completed = std::pin::pin!(completed);

    let mut slots: Vec<Option<T>> = Vec::new();
    while let Some((index, value)) = completed.next().await {
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(value);
    }

    // buffer_unordered yields every admitted unit exactly once.
    slots.into_iter().flatten().collect()
}

/// One failed prompt of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub index: usize,
    pub prompt: String,
    pub error: String,
}

/// Summary of a batch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub errors: Vec<BatchError>,
}

impl BatchReport {
    /// Summarize `outcome`; `prompts` must be the batch input, index-aligned.
    pub fn from_outcome(prompts: &[String], outcome: &BatchOutcome) -> Self {
        let errors: Vec<BatchError> = outcome
            .iter()
            .enumerate()
            .filter_map(|(index, result)| {
                result.as_ref().err().map(|e| BatchError {
                    index,
                    prompt: prompts.get(index).cloned().unwrap_or_default(),
                    error: e.to_string(),
                })
            })
            .collect();

        Self {
            total: outcome.len(),
            successes: outcome.len() - errors.len(),
            failures: errors.len(),
            errors,
        }
    }
}
