//! Per-item outcomes and the batch summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use reelsmith_common::error::ReelsmithError;

/// How a single item finished when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Rendered,
    /// The output video was already on disk.
    AlreadyExists,
}

/// A contained per-item error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    /// Stable label from [`ReelsmithError::kind`].
    pub kind: String,
    pub message: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, error: &ReelsmithError) -> Self {
        Self {
            item: item.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Narration files found, before any filtering.
    pub discovered: usize,
    pub rendered: usize,
    /// Items whose output already existed.
    pub skipped: usize,
    pub failed: Vec<ItemFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub(crate) fn start(discovered: usize) -> Self {
        let now = Utc::now();
        Self {
            discovered,
            rendered: 0,
            skipped: 0,
            failed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn record(&mut self, item: &str, result: &Result<ItemOutcome, ReelsmithError>) {
        match result {
            Ok(ItemOutcome::Rendered) => self.rendered += 1,
            Ok(ItemOutcome::AlreadyExists) => self.skipped += 1,
            Err(err) => self.failed.push(ItemFailure::new(item, err)),
        }
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Items that were attempted (rendered or failed).
    pub fn attempted(&self) -> usize {
        self.rendered + self.failed.len()
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
