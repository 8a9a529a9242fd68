//! Snapshot handed to the summary renderer after a successful refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::countries::Country;
use crate::errors::Result;

/// Number of countries shown in the summary.
pub const SUMMARY_TOP_N: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub name: String,
    pub estimated_gdp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySnapshot {
    pub total_count: i64,
    pub top: Vec<SummaryEntry>,
    pub generated_at: DateTime<Utc>,
}

impl SummarySnapshot {
    pub fn new(total_count: i64, top: Vec<Country>) -> Self {
        let top = top
            .into_iter()
            .filter_map(|c| {
                c.estimated_gdp.map(|gdp| SummaryEntry {
                    name: c.name,
                    estimated_gdp: gdp,
                })
            })
            .collect();
        Self {
            total_count,
            top,
            generated_at: Utc::now(),
        }
    }
}

/// Produces the visual summary artifact. Blocking; callers run it off the async executor.
pub trait SummaryRendererTrait: Send + Sync {
    fn render(&self, snapshot: &SummarySnapshot) -> Result<()>;
}

/// Renderer used when no artifact is wanted.
pub struct NoOpSummaryRenderer;

impl SummaryRendererTrait for NoOpSummaryRenderer {
    fn render(&self, _snapshot: &SummarySnapshot) -> Result<()> {
        Ok(())
    }
}
