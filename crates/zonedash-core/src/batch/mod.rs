//! Partial-failure batch executor
//!
//! Runs one async operation per item, strictly one after another in input
//! order, and records every item's outcome. A failing item never stops the
//! batch and the executor itself never returns an error: partial application
//! is reported through [`BatchResult::summary`].
//!
//! ```rust
//! use zonedash_core::batch::BatchExecutor;
//!
//! # tokio_test::block_on(async {
//! let result = BatchExecutor::new("demo")
//!     .run(vec![1, 2, 3], |id| async move {
//!         if id == 2 { Err("boom") } else { Ok(id * 10) }
//!     })
//!     .await;
//!
//! assert_eq!(result.summary().failed, 1);
//! # });
//! ```

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};

/// Outcome of one batch item
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T, E> {
    /// Item identifier, as displayed
    pub item_id: String,
    /// What the operation returned for this item
    pub outcome: Result<T, E>,
}

impl<T, E> BatchOutcome<T, E> {
    /// Whether the item succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Serialized as `{ itemId, success, result }` or `{ itemId, success, error }`
impl<T, E> Serialize for BatchOutcome<T, E>
where
    T: Serialize,
    E: fmt::Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchOutcome", 3)?;
        state.serialize_field("itemId", &self.item_id)?;
        state.serialize_field("success", &self.outcome.is_ok())?;
        match &self.outcome {
            Ok(value) => state.serialize_field("result", value)?,
            Err(e) => state.serialize_field("error", &e.to_string())?,
        }
        state.end()
    }
}

/// Counts derived from a batch's outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchSummary {
    /// Number of items
    pub total: usize,
    /// Items that succeeded
    pub succeeded: usize,
    /// Items that failed
    pub failed: usize,
}

/// Ordered outcomes of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T, E> {
    outcomes: Vec<BatchOutcome<T, E>>,
}

impl<T, E> BatchResult<T, E> {
    /// Outcomes in input order
    pub fn outcomes(&self) -> &[BatchOutcome<T, E>] {
        &self.outcomes
    }

    /// Consume the result, returning the outcomes in input order
    pub fn into_outcomes(self) -> Vec<BatchOutcome<T, E>> {
        self.outcomes
    }

    /// Summary counts
    pub fn summary(&self) -> BatchSummary {
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        BatchSummary {
            total: self.outcomes.len(),
            succeeded,
            failed: self.outcomes.len() - succeeded,
        }
    }

    /// Whether at least one item failed
    pub fn is_partial_failure(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }
}

impl<T, E> Serialize for BatchResult<T, E>
where
    T: Serialize,
    E: fmt::Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 2)?;
        state.serialize_field("results", &self.outcomes)?;
        state.serialize_field("summary", &self.summary())?;
        state.end()
    }
}

/// Sequential batch executor
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    label: String,
}

impl BatchExecutor {
    /// Create an executor; `label` only appears in logs
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Run `operation` for each item in order
    ///
    /// Each call is awaited before the next one starts. No retries.
    pub async fn run<I, T, E, F, Fut>(&self, items: Vec<I>, mut operation: F) -> BatchResult<T, E>
    where
        I: fmt::Display,
        E: fmt::Display,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let item_id = item.to_string();
            let outcome = operation(item).await;

            match &outcome {
                Ok(_) => debug!("{}: item {} succeeded", self.label, item_id),
                Err(e) => warn!("{}: item {} failed: {}", self.label, item_id, e),
            }

            outcomes.push(BatchOutcome { item_id, outcome });
        }

        let result = BatchResult { outcomes };
        let summary = result.summary();
        info!(
            "{}: {} items, {} succeeded, {} failed",
            self.label, summary.total, summary.succeeded, summary.failed
        );
        result
    }
}
