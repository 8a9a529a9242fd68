//! HTTP clients for the external feeds consumed by a refresh.

pub mod errors;
pub mod provider;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use countryxchange_core::countries::{CountrySourceTrait, RawCountry};
use countryxchange_core::{Result, Source};
use log::debug;

pub use errors::SourceError;
pub use provider::exchange_rates::ExchangeRatesProvider;
pub use provider::rest_countries::RestCountriesProvider;
pub use provider::DEFAULT_REQUEST_TIMEOUT;

/// Endpoints and timeout for both feeds.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub directory_url: String,
    pub rates_url: String,
    pub timeout: Duration,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            directory_url: provider::rest_countries::DEFAULT_URL.to_string(),
            rates_url: provider::exchange_rates::DEFAULT_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Country directory and rate feed over HTTP.
///
/// Each call is a single attempt bounded by the configured timeout. Any
/// failure is reported as `Error::SourceUnavailable` naming the feed.
pub struct HttpCountrySource {
    directory: RestCountriesProvider,
    rates: ExchangeRatesProvider,
}

impl HttpCountrySource {
    pub fn new(config: &SourcesConfig) -> Self {
        Self {
            directory: RestCountriesProvider::with_url(&config.directory_url, config.timeout),
            rates: ExchangeRatesProvider::with_url(&config.rates_url, config.timeout),
        }
    }
}

#[async_trait]
impl CountrySourceTrait for HttpCountrySource {
    async fn fetch_directory(&self) -> Result<Vec<RawCountry>> {
        let countries = self
            .directory
            .fetch_countries()
            .await
            .map_err(|e| e.into_core(Source::Directory))?;
        debug!("Directory feed returned {} entries", countries.len());
        Ok(countries)
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        let rates = self
            .rates
            .fetch_rates()
            .await
            .map_err(|e| e.into_core(Source::Rates))?;
        debug!("Rate feed returned {} currencies", rates.len());
        Ok(rates)
    }
}
