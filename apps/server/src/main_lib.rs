//! Application state and startup wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use countryxchange_core::countries::CountryRepositoryTrait;
use countryxchange_core::refresh::{random_multipliers, RefreshService, RefreshServiceTrait};
use countryxchange_sources::HttpCountrySource;
use countryxchange_storage_sqlite::{create_pool, init, spawn_writer, CountryRepository};
use countryxchange_summary::PngSummaryRenderer;

use crate::config::AppConfig;

pub struct AppState {
    pub refresh_service: Arc<dyn RefreshServiceTrait>,
    pub repository: Arc<dyn CountryRepositoryTrait>,
    pub config: Arc<AppConfig>,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

pub async fn build_state(config: AppConfig) -> Result<Arc<AppState>> {
    let db_path = init(&config.database_path).context("failed to prepare database path")?;
    let pool = create_pool(&db_path).context("failed to open database")?;
    let writer = spawn_writer(pool.as_ref().clone());

    let repository: Arc<dyn CountryRepositoryTrait> =
        Arc::new(CountryRepository::new(Arc::clone(&pool), writer));
    repository
        .ensure_schema()
        .await
        .context("failed to bootstrap database schema")?;
    info!("Database ready at {}", db_path);

    let source = Arc::new(HttpCountrySource::new(&config.sources));
    let renderer = Arc::new(PngSummaryRenderer::new(config.summary_image_path.clone()));
    let refresh_service = RefreshService::new(source, Arc::clone(&repository))
        .with_renderer(renderer)
        .with_multipliers(random_multipliers(config.refresh_seed));

    Ok(Arc::new(AppState {
        refresh_service: Arc::new(refresh_service),
        repository,
        config: Arc::new(config),
    }))
}
