//! REST Countries provider for the country directory.
//!
//! The v2 `all` endpoint returns every country with the requested fields only.
//! Missing or `null` fields decode to defaults so one sparse entry never fails
//! the batch; the refresh pipeline decides what to keep.

use std::time::Duration;

use countryxchange_core::countries::RawCountry;
use reqwest::Client;
use serde::Deserialize;

use super::{build_client, get_json, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::SourceError;

pub const PROVIDER_ID: &str = "RESTCOUNTRIES";
pub const DEFAULT_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";

#[derive(Debug, Deserialize)]
struct CurrencyEntry {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    capital: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    population: Option<i64>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    currencies: Option<Vec<CurrencyEntry>>,
}

impl From<CountryEntry> for RawCountry {
    fn from(entry: CountryEntry) -> Self {
        RawCountry {
            name: entry.name.unwrap_or_default(),
            capital: entry.capital,
            region: entry.region,
            population: entry.population.unwrap_or_default(),
            flag_url: entry.flag,
            currency_codes: entry
                .currencies
                .unwrap_or_default()
                .into_iter()
                .map(|c| c.code.unwrap_or_default())
                .collect(),
        }
    }
}

pub struct RestCountriesProvider {
    client: Client,
    url: String,
}

impl RestCountriesProvider {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_url(url: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            url: url.to_string(),
        }
    }

    pub async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        let entries: Vec<CountryEntry> = get_json(&self.client, &self.url, PROVIDER_ID).await?;
        Ok(entries.into_iter().map(RawCountry::from).collect())
    }
}

impl Default for RestCountriesProvider {
    fn default() -> Self {
        Self::new()
    }
}
