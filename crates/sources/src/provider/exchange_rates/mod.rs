//! Open Exchange Rates (open.er-api.com) provider.
//!
//! Rates are quoted as units of each currency per one USD.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{build_client, get_json, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::SourceError;

pub const PROVIDER_ID: &str = "OPEN_ER_API";
pub const DEFAULT_URL: &str = "https://open.er-api.com/v6/latest/USD";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    result: Option<String>,
    rates: HashMap<String, f64>,
}

pub struct ExchangeRatesProvider {
    client: Client,
    url: String,
}

impl ExchangeRatesProvider {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_url(url: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            url: url.to_string(),
        }
    }

    pub async fn fetch_rates(&self) -> Result<HashMap<String, f64>, SourceError> {
        let body: LatestRatesResponse = get_json(&self.client, &self.url, PROVIDER_ID).await?;
        if let Some(result) = body.result.as_deref() {
            if result != "success" {
                return Err(SourceError::decode(
                    PROVIDER_ID,
                    format!("unexpected result '{}'", result),
                ));
            }
        }
        Ok(body.rates)
    }
}

impl Default for ExchangeRatesProvider {
    fn default() -> Self {
        Self::new()
    }
}
