//! Runtime configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use countryxchange_sources::SourcesConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "data/countries.db";
const DEFAULT_SUMMARY_IMAGE_PATH: &str = "cache/summary.png";

/// Values published in the API document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocsConfig {
    pub host: Option<String>,
    pub schemes: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            host: None,
            schemes: vec!["http".to_string(), "https".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_env: String,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub summary_image_path: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub sources: SourcesConfig,
    pub refresh_seed: Option<u64>,
    pub docs: DocsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            summary_image_path: PathBuf::from(DEFAULT_SUMMARY_IMAGE_PATH),
            cors_allowed_origins: vec!["*".to_string()],
            sources: SourcesConfig::default(),
            refresh_seed: None,
            docs: DocsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => defaults.port,
        };

        let mut sources = defaults.sources.clone();
        if let Some(url) = get("COUNTRIES_API_URL") {
            sources.directory_url = url;
        }
        if let Some(url) = get("RATES_API_URL") {
            sources.rates_url = url;
        }
        if let Some(raw) = get("SOURCE_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("SOURCE_TIMEOUT_SECS must be an integer, got '{raw}'"))?;
            sources.timeout = Duration::from_secs(secs);
        }

        let refresh_seed = get("REFRESH_SEED")
            .map(|raw| {
                raw.parse::<u64>()
                    .with_context(|| format!("REFRESH_SEED must be an integer, got '{raw}'"))
            })
            .transpose()?;

        let database_path = get("DATABASE_URL")
            .map(|url| url.trim_start_matches("sqlite://").to_string())
            .unwrap_or(defaults.database_path);

        Ok(Self {
            app_env: get("APP_ENV").unwrap_or(defaults.app_env),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_path,
            summary_image_path: get("SUMMARY_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.summary_image_path),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.cors_allowed_origins),
            sources,
            refresh_seed,
            docs: DocsConfig {
                host: get("SWAGGER_HOST"),
                schemes: get("SWAGGER_SCHEMES")
                    .map(|raw| split_list(&raw))
                    .unwrap_or(defaults.docs.schemes),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
