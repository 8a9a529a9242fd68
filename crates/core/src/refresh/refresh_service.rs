use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use super::gdp::{merge_country, random_multipliers, GdpEstimator, MultiplierFactory};
use super::refresh_model::{MergeStats, RefreshResult, RefreshStage};
use crate::countries::{
    validate, CountryRepositoryTrait, CountrySourceTrait, CountryWriter, RawCountry,
};
use crate::errors::{Error, Result};
use crate::summary::{
    NoOpSummaryRenderer, SummaryRendererTrait, SummarySnapshot, SUMMARY_TOP_N,
};

#[async_trait]
pub trait RefreshServiceTrait: Send + Sync {
    /// Fetches both feeds, merges them and commits the result in one transaction.
    ///
    /// Returns `Error::SourceUnavailable` without touching the store when either
    /// feed fails. Any store failure after the transaction opened rolls back the
    /// whole run. On success a summary render is started in the background; its
    /// outcome never affects the returned value.
    async fn refresh(&self) -> Result<RefreshResult>;
}

pub struct RefreshService {
    source: Arc<dyn CountrySourceTrait>,
    repository: Arc<dyn CountryRepositoryTrait>,
    renderer: Arc<dyn SummaryRendererTrait>,
    multipliers: MultiplierFactory,
    // Serializes overlapping runs from fetch through commit.
    run_lock: Mutex<()>,
}

impl RefreshService {
    pub fn new(
        source: Arc<dyn CountrySourceTrait>,
        repository: Arc<dyn CountryRepositoryTrait>,
    ) -> Self {
        Self {
            source,
            repository,
            renderer: Arc::new(NoOpSummaryRenderer),
            multipliers: random_multipliers(None),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn SummaryRendererTrait>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replaces the multiplier source used by the GDP estimator. A new source is built per run.
    pub fn with_multipliers(mut self, multipliers: MultiplierFactory) -> Self {
        self.multipliers = multipliers;
        self
    }

    async fn fetch_sources(&self) -> Result<(Vec<RawCountry>, HashMap<String, f64>)> {
        let directory = self.source.fetch_directory().await?;
        debug!("Fetched {} countries from directory", directory.len());
        let rates = self.source.fetch_rates().await?;
        debug!("Fetched {} exchange rates", rates.len());
        Ok((directory, rates))
    }

    /// Starts the detached summary render.
    ///
    /// Fire-and-forget: no handle is kept, nothing is awaited, failures are only logged.
    fn spawn_summary_render(&self) {
        let repository = Arc::clone(&self.repository);
        let renderer = Arc::clone(&self.renderer);
        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                render_summary(repository.as_ref(), renderer.as_ref())
            })
            .await;
            match outcome {
                Ok(Ok(())) => info!("Summary image regenerated"),
                Ok(Err(e)) => warn!("Summary image generation failed: {}", e),
                Err(e) => warn!("Summary image task failed: {}", e),
            }
        });
    }
}

#[async_trait]
impl RefreshServiceTrait for RefreshService {
    async fn refresh(&self) -> Result<RefreshResult> {
        let _run_guard = self.run_lock.lock().await;
        let started_at = Instant::now();

        debug!("Refresh stage: {}", RefreshStage::Fetching);
        let (directory, rates) = match self.fetch_sources().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Refresh {}: {}", RefreshStage::Aborted, e);
                return Err(e);
            }
        };

        debug!("Refresh stage: {}", RefreshStage::Preparing);
        self.repository.ensure_schema().await.map_err(|e| {
            error!("Schema bootstrap failed: {}", e);
            e
        })?;

        let refreshed_at = Utc::now().trunc_subsecs(0);
        let estimator = GdpEstimator::new((self.multipliers)());

        let processed_count = self
            .repository
            .run_refresh_transaction(Box::new(
                move |writer: &mut dyn CountryWriter| -> Result<usize> {
                    debug!("Refresh stage: {}", RefreshStage::Merging);
                    apply_refresh(writer, &directory, &rates, estimator, refreshed_at)
                        .map(|stats| stats.upserted)
                },
            ))
            .await
            .map_err(|e| {
                error!("Refresh {}: transaction rolled back: {}", RefreshStage::Aborted, e);
                e
            })?;

        info!(
            "Refresh committed {} countries in {}ms",
            processed_count,
            started_at.elapsed().as_millis()
        );

        debug!("Refresh stage: {}", RefreshStage::Rendering);
        self.spawn_summary_render();

        debug!("Refresh stage: {}", RefreshStage::Done);
        Ok(RefreshResult {
            processed_count,
            last_refreshed_at: refreshed_at,
        })
    }
}

/// Merge step plus metadata write, run against an open transaction.
///
/// Unnamed and invalid entries are skipped; the first store error is returned
/// so the caller's transaction rolls back.
pub fn apply_refresh(
    writer: &mut dyn CountryWriter,
    directory: &[RawCountry],
    rates: &HashMap<String, f64>,
    mut estimator: GdpEstimator,
    refreshed_at: DateTime<Utc>,
) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    for raw in directory {
        if raw.name.trim().is_empty() {
            warn!("Skipping directory entry without a name");
            stats.skipped_unnamed += 1;
            continue;
        }

        let candidate = merge_country(raw, rates, &mut estimator, refreshed_at);
        if let Err(violations) = validate(&candidate) {
            warn!(
                "Skipping country '{}': validation failed ({})",
                candidate.name, violations
            );
            stats.skipped_invalid += 1;
            continue;
        }

        writer.upsert_country(&candidate).map_err(|e| {
            error!("Upsert failed for country '{}': {}", candidate.name, e);
            e
        })?;
        stats.upserted += 1;
    }

    debug!("Refresh stage: {}", RefreshStage::Committing);
    writer.set_last_refreshed_at(refreshed_at)?;

    info!(
        "Merged countries: {} upserted, {} invalid, {} unnamed",
        stats.upserted, stats.skipped_invalid, stats.skipped_unnamed
    );
    Ok(stats)
}

/// Loads the committed snapshot and hands it to the renderer.
pub fn render_summary(
    repository: &dyn CountryRepositoryTrait,
    renderer: &dyn SummaryRendererTrait,
) -> Result<()> {
    let total = repository.count_countries()?;
    let top = repository.top_by_estimated_gdp(SUMMARY_TOP_N)?;
    let snapshot = SummarySnapshot::new(total, top);
    renderer.render(&snapshot).map_err(|e| match e {
        Error::Render(_) => e,
        other => Error::Render(other.to_string()),
    })
}
