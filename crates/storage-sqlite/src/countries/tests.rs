use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{SubsecRound, TimeZone, Utc};
use diesel::prelude::*;
use tempfile::TempDir;

use countryxchange_core::countries::{
    CountryFilter, CountryRepositoryTrait, CountrySourceTrait, CountryWriter, NewCountry,
    RawCountry,
};
use countryxchange_core::refresh::{
    MultiplierFactory, MultiplierSource, RefreshService, RefreshServiceTrait,
};
use countryxchange_core::{Error, Result, Source};

use super::CountryRepository;
use crate::db::{create_pool, get_connection, init, spawn_writer, DbPool};
use crate::metadata;

struct TestStore {
    repo: Arc<CountryRepository>,
    pool: Arc<DbPool>,
    _dir: TempDir,
}

async fn setup() -> TestStore {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = init(&dir.path().join("countries.db").to_string_lossy()).expect("init");
    let pool = create_pool(&db_path).expect("pool");
    let writer = spawn_writer(pool.as_ref().clone());
    let repo = Arc::new(CountryRepository::new(Arc::clone(&pool), writer));
    repo.ensure_schema().await.expect("schema");
    TestStore {
        repo,
        pool,
        _dir: dir,
    }
}

fn new_country(name: &str, region: &str, currency: &str, gdp: Option<f64>) -> NewCountry {
    NewCountry {
        name: name.to_string(),
        capital: None,
        region: Some(region.to_string()),
        population: 1_000,
        currency_code: Some(currency.to_string()),
        exchange_rate: Some(1.0),
        estimated_gdp: gdp,
        flag_url: None,
        last_refreshed_at: Utc.with_ymd_and_hms(2025, 10, 22, 12, 0, 0).unwrap(),
    }
}

async fn seed(repo: &CountryRepository, rows: Vec<NewCountry>) {
    repo.run_refresh_transaction(Box::new(
        move |writer: &mut dyn CountryWriter| -> Result<usize> {
            for row in &rows {
                writer.upsert_country(row)?;
            }
            Ok(rows.len())
        },
    ))
    .await
    .expect("seed");
}

fn raw(name: &str, population: i64, currency: Option<&str>) -> RawCountry {
    RawCountry {
        name: name.to_string(),
        capital: Some("Capital".to_string()),
        region: Some("Africa".to_string()),
        population,
        flag_url: None,
        currency_codes: currency.map(|c| vec![c.to_string()]).unwrap_or_default(),
    }
}

struct StubSource {
    directory: Mutex<Vec<RawCountry>>,
    rates: Mutex<Option<HashMap<String, f64>>>,
}

impl StubSource {
    fn new(directory: Vec<RawCountry>, rates: Option<HashMap<String, f64>>) -> Self {
        Self {
            directory: Mutex::new(directory),
            rates: Mutex::new(rates),
        }
    }

    fn set_directory(&self, directory: Vec<RawCountry>) {
        *self.directory.lock().unwrap() = directory;
    }

    fn set_rates(&self, rates: Option<HashMap<String, f64>>) {
        *self.rates.lock().unwrap() = rates;
    }
}

#[async_trait]
impl CountrySourceTrait for StubSource {
    async fn fetch_directory(&self) -> Result<Vec<RawCountry>> {
        Ok(self.directory.lock().unwrap().clone())
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        self.rates
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::source_unavailable(Source::Rates))
    }
}

struct Fixed(u32);

impl MultiplierSource for Fixed {
    fn next_multiplier(&mut self) -> u32 {
        self.0
    }
}

fn fixed(value: u32) -> MultiplierFactory {
    Arc::new(move || -> Box<dyn MultiplierSource> { Box::new(Fixed(value)) })
}

fn rates(pairs: &[(&str, f64)]) -> Option<HashMap<String, f64>> {
    Some(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
}

#[tokio::test]
async fn upsert_overwrites_by_name_and_keeps_id() {
    let store = setup().await;
    let source = Arc::new(StubSource::new(
        vec![raw("Wakanda", 5, Some("WKD"))],
        rates(&[("WKD", 2.0)]),
    ));
    let service = RefreshService::new(source.clone(), store.repo.clone())
        .with_multipliers(fixed(1000));

    service.refresh().await.expect("first refresh");
    let first = store.repo.get_country("Wakanda").expect("stored");
    assert_eq!(first.population, 5);
    assert_eq!(first.estimated_gdp, Some(2500.0));

    source.set_directory(vec![raw("wakanda", 9, Some("WKD"))]);
    service.refresh().await.expect("second refresh");

    assert_eq!(store.repo.count_countries().unwrap(), 1);
    let second = store.repo.get_country("WAKANDA").expect("case-insensitive lookup");
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Wakanda");
    assert_eq!(second.population, 9);
    assert_eq!(second.estimated_gdp, Some(4500.0));
}

#[tokio::test]
async fn refresh_records_timestamp_and_skips_invalid_rows() {
    let store = setup().await;
    let source = Arc::new(StubSource::new(
        vec![
            raw("Nigeria", 1_000, Some("NGN")),
            raw("Nowhere", 0, Some("NGN")),
            raw("", 50, Some("NGN")),
            raw("Antarctica", 1_000, None),
            raw("Atlantis", 10, Some("XYZ")),
        ],
        rates(&[("NGN", 1600.0)]),
    ));
    let service =
        RefreshService::new(source, store.repo.clone()).with_multipliers(fixed(1600));

    let before = Utc::now().trunc_subsecs(0);
    let result = service.refresh().await.expect("refresh");

    assert_eq!(result.processed_count, 2);
    assert!(result.last_refreshed_at >= before);
    assert_eq!(
        store.repo.get_last_refreshed_at().unwrap(),
        Some(result.last_refreshed_at)
    );

    let nigeria = store.repo.get_country("nigeria").unwrap();
    assert_eq!(nigeria.estimated_gdp, Some(1_000.0));
    assert_eq!(nigeria.last_refreshed_at, result.last_refreshed_at);
    assert!(matches!(
        store.repo.get_country("Nowhere"),
        Err(Error::NotFound(_))
    ));
    // Unquoted currency is stored without an estimate; a missing one fails validation.
    let atlantis = store.repo.get_country("Atlantis").unwrap();
    assert_eq!(atlantis.currency_code.as_deref(), Some("XYZ"));
    assert_eq!(atlantis.exchange_rate, None);
    assert_eq!(atlantis.estimated_gdp, None);
    assert!(store.repo.get_country("Antarctica").is_err());
}

#[tokio::test]
async fn failed_rate_fetch_leaves_store_untouched() {
    let store = setup().await;
    let source = Arc::new(StubSource::new(
        vec![raw("Ghana", 100, Some("GHS"))],
        rates(&[("GHS", 10.0)]),
    ));
    let service = RefreshService::new(source.clone(), store.repo.clone())
        .with_multipliers(fixed(1000));
    let committed = service.refresh().await.expect("initial refresh");

    source.set_directory(vec![raw("Ghana", 999, Some("GHS")), raw("Togo", 5, Some("XOF"))]);
    source.set_rates(None);
    let err = service.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        Error::SourceUnavailable {
            provider: Source::Rates
        }
    ));
    assert_eq!(store.repo.count_countries().unwrap(), 1);
    assert_eq!(store.repo.get_country("Ghana").unwrap().population, 100);
    assert_eq!(
        store.repo.get_last_refreshed_at().unwrap(),
        Some(committed.last_refreshed_at)
    );
}

#[tokio::test]
async fn seeded_refreshes_are_reproducible() {
    let store = setup().await;
    let source = Arc::new(StubSource::new(
        vec![raw("Kenya", 50_000, Some("KES")), raw("Chad", 17_000, Some("XAF"))],
        rates(&[("KES", 129.0), ("XAF", 600.0)]),
    ));
    let service = RefreshService::new(source, store.repo.clone())
        .with_multipliers(countryxchange_core::refresh::random_multipliers(Some(7)));

    service.refresh().await.unwrap();
    let first = store.repo.list_countries(&CountryFilter::default()).unwrap();
    service.refresh().await.unwrap();
    let second = store.repo.list_countries(&CountryFilter::default()).unwrap();

    let estimates = |rows: &[countryxchange_core::countries::Country]| {
        rows.iter().map(|c| c.estimated_gdp).collect::<Vec<_>>()
    };
    assert_eq!(estimates(&first), estimates(&second));
}

#[tokio::test]
async fn list_filters_fold_case_and_sort_by_estimate() {
    let store = setup().await;
    seed(
        &store.repo,
        vec![
            new_country("Ten", "americas", "USD", Some(10.0)),
            new_country("Thirty", "Americas", "usd", Some(30.0)),
            new_country("Twenty", "AMERICAS", "USD", Some(20.0)),
            new_country("Unknown", "Americas", "XYZ", None),
            new_country("Elsewhere", "Europe", "EUR", Some(99.0)),
        ],
    )
    .await;

    let filter = CountryFilter::new(Some("AMERICAS".to_string()), None, Some("gdp_desc"));
    let names: Vec<String> = store
        .repo
        .list_countries(&filter)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Thirty", "Twenty", "Ten", "Unknown"]);

    let filter = CountryFilter::new(None, Some("usd".to_string()), Some("gdp_asc"));
    let names: Vec<String> = store
        .repo
        .list_countries(&filter)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Ten", "Twenty", "Thirty"]);

    let all = store.repo.list_countries(&CountryFilter::default()).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].name, "Ten");
}

#[tokio::test]
async fn top_by_estimate_skips_unknown_estimates() {
    let store = setup().await;
    seed(
        &store.repo,
        vec![
            new_country("A", "X", "AAA", Some(1.0)),
            new_country("B", "X", "BBB", None),
            new_country("C", "X", "CCC", Some(3.0)),
            new_country("D", "X", "DDD", Some(2.0)),
        ],
    )
    .await;

    let top = store.repo.top_by_estimated_gdp(2).unwrap();
    let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["C", "D"]);
}

#[tokio::test]
async fn delete_is_case_insensitive() {
    let store = setup().await;
    seed(&store.repo, vec![new_country("Ghana", "Africa", "GHS", Some(5.0))]).await;

    assert!(store.repo.delete_country("gHaNa").await.unwrap());
    assert!(!store.repo.delete_country("Ghana").await.unwrap());
    assert_eq!(store.repo.count_countries().unwrap(), 0);
}

#[tokio::test]
async fn unparsable_refresh_timestamp_reads_as_none() {
    let store = setup().await;
    assert_eq!(store.repo.get_last_refreshed_at().unwrap(), None);

    let mut conn = get_connection(&store.pool).unwrap();
    metadata::put_value(&mut conn, metadata::LAST_REFRESHED_AT_KEY, "not a date").unwrap();
    assert_eq!(store.repo.get_last_refreshed_at().unwrap(), None);
}

#[tokio::test]
async fn drop_tables_leaves_an_empty_usable_store() {
    let store = setup().await;
    seed(&store.repo, vec![new_country("Ghana", "Africa", "GHS", Some(5.0))]).await;
    store
        .repo
        .run_refresh_transaction(Box::new(|writer: &mut dyn CountryWriter| -> Result<usize> {
            writer.set_last_refreshed_at(Utc::now())?;
            Ok(0)
        }))
        .await
        .unwrap();

    store.repo.drop_tables().await.unwrap();

    assert_eq!(store.repo.count_countries().unwrap(), 0);
    assert!(store.repo.list_countries(&CountryFilter::default()).unwrap().is_empty());
    assert_eq!(store.repo.get_last_refreshed_at().unwrap(), None);
    assert!(!store.repo.delete_country("Ghana").await.unwrap());

    seed(&store.repo, vec![new_country("Togo", "Africa", "XOF", Some(1.0))]).await;
    assert_eq!(store.repo.count_countries().unwrap(), 1);
}

#[tokio::test]
async fn failing_job_rolls_back_every_upsert() {
    let store = setup().await;
    let result = store
        .repo
        .run_refresh_transaction(Box::new(|writer: &mut dyn CountryWriter| -> Result<usize> {
            writer.upsert_country(&new_country("Mali", "Africa", "XOF", Some(1.0)))?;
            Err(Error::Unexpected("boom".to_string()))
        }))
        .await;

    assert!(result.is_err());
    let mut conn = get_connection(&store.pool).unwrap();
    let rows: i64 = crate::schema::countries::table
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn non_ascii_names_and_regions_fold_case() {
    let store = setup().await;
    seed(
        &store.repo,
        vec![
            new_country("Åland Islands", "Europe", "EUR", Some(3.0)),
            new_country("Côte d'Ivoire", "Afrique", "XOF", Some(2.0)),
            new_country("Wallis et Futuna", "Océanie", "XPF", Some(1.0)),
        ],
    )
    .await;

    let aland = store.repo.get_country("åland islands").expect("folded lookup");
    assert_eq!(aland.name, "Åland Islands");
    assert_eq!(
        store.repo.get_country("CÔTE D'IVOIRE").unwrap().name,
        "Côte d'Ivoire"
    );

    // Same key in a different case updates the existing row.
    let mut renamed = new_country("ÅLAND ISLANDS", "Europe", "EUR", Some(9.0));
    renamed.population = 30_000;
    seed(&store.repo, vec![renamed]).await;
    assert_eq!(store.repo.count_countries().unwrap(), 3);
    let aland_again = store.repo.get_country("Åland Islands").unwrap();
    assert_eq!(aland_again.id, aland.id);
    assert_eq!(aland_again.name, "Åland Islands");
    assert_eq!(aland_again.population, 30_000);

    let filter = CountryFilter::new(Some("OCÉANIE".to_string()), None, None);
    let names: Vec<String> = store
        .repo
        .list_countries(&filter)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Wallis et Futuna"]);

    assert!(store.repo.delete_country("côte d'ivoire").await.unwrap());
    assert_eq!(store.repo.count_countries().unwrap(), 2);
}
