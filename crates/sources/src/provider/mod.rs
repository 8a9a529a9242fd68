//! HTTP providers for the country directory and exchange rate feeds.

pub mod exchange_rates;
pub mod rest_countries;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::errors::SourceError;

/// Default timeout for a single feed request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Single GET with no retries. Non-2xx statuses and undecodable bodies are errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    provider: &str,
) -> Result<T, SourceError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::transport(provider, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::status(provider, status.as_u16()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| SourceError::transport(provider, e))?;
    serde_json::from_str(&body).map_err(|e| SourceError::decode(provider, e))
}
