//! Country domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Case-insensitive identity for names, regions and currency codes.
///
/// Uses full Unicode lowercasing, so "ÅLAND ISLANDS" and "åland islands" share a key.
pub fn fold_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A country record as delivered by the directory feed, before merging with rates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub flag_url: Option<String>,
    /// Currency codes in feed order. Only the first one is used for estimates.
    pub currency_codes: Vec<String>,
}

impl RawCountry {
    /// First non-empty currency code, if the feed listed one first.
    pub fn primary_currency(&self) -> Option<&str> {
        self.currency_codes
            .first()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
    }
}

/// A stored country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub population: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gdp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Candidate row produced by the refresh merge step.
///
/// `estimated_gdp` is `Some(0.0)` when no currency is known, `None` when the
/// currency has no quoted rate, and the computed estimate otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Ordering applied to a country listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountrySort {
    GdpDesc,
    GdpAsc,
    #[default]
    Unordered,
}

impl CountrySort {
    /// Parses the `sort` query token. Unknown tokens mean no ordering.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "gdp_desc" => CountrySort::GdpDesc,
            "gdp_asc" => CountrySort::GdpAsc,
            _ => CountrySort::Unordered,
        }
    }
}

/// Optional filters for listing countries. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: CountrySort,
}

impl CountryFilter {
    pub fn new(region: Option<String>, currency: Option<String>, sort: Option<&str>) -> Self {
        Self {
            region: non_blank(region),
            currency: non_blank(currency),
            sort: sort.map(CountrySort::from_token).unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
