//! Seams between the refresh pipeline and its collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Country, CountryFilter, NewCountry, RawCountry};
use crate::errors::Result;

/// Transaction-scoped write access handed to a refresh job.
///
/// Nothing written through a `CountryWriter` is visible to readers until the
/// enclosing job returns `Ok`; an `Err` discards every write.
pub trait CountryWriter {
    /// Inserts the country or overwrites every mutable column of the row with
    /// the same (case-folded) name.
    fn upsert_country(&mut self, country: &NewCountry) -> Result<()>;

    /// Records when the current synchronization committed.
    fn set_last_refreshed_at(&mut self, at: DateTime<Utc>) -> Result<()>;
}

/// Unit of work executed inside a single store transaction.
pub type RefreshJob = Box<dyn FnOnce(&mut dyn CountryWriter) -> Result<usize> + Send + 'static>;

#[async_trait]
pub trait CountryRepositoryTrait: Send + Sync {
    /// Creates the country and metadata tables when they are missing.
    async fn ensure_schema(&self) -> Result<()>;

    /// Runs `job` inside one transaction, committing only if it succeeds.
    async fn run_refresh_transaction(&self, job: RefreshJob) -> Result<usize>;

    fn list_countries(&self, filter: &CountryFilter) -> Result<Vec<Country>>;

    fn get_country(&self, name: &str) -> Result<Country>;

    async fn delete_country(&self, name: &str) -> Result<bool>;

    fn count_countries(&self) -> Result<i64>;

    /// Tolerates a missing or unparsable stored value by returning `None`.
    fn get_last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Countries with a known estimate, highest first.
    fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<Country>>;

    async fn drop_tables(&self) -> Result<()>;
}

/// The two external feeds consumed by a refresh.
#[async_trait]
pub trait CountrySourceTrait: Send + Sync {
    async fn fetch_directory(&self) -> Result<Vec<RawCountry>>;

    /// Currency code to units-per-base-currency.
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>>;
}
