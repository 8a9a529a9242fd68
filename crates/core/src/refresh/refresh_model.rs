//! Refresh run models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a committed synchronization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResult {
    pub processed_count: usize,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Stages of one run, in order. `Aborted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Fetching,
    Preparing,
    Merging,
    Committing,
    Rendering,
    Done,
    Aborted,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshStage::Fetching => "fetching",
            RefreshStage::Preparing => "preparing",
            RefreshStage::Merging => "merging",
            RefreshStage::Committing => "committing",
            RefreshStage::Rendering => "rendering",
            RefreshStage::Done => "done",
            RefreshStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Per-run counters collected while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub upserted: usize,
    pub skipped_unnamed: usize,
    pub skipped_invalid: usize,
}
