//! Error taxonomy shared by every countryxchange crate.

use std::fmt;

use thiserror::Error;

use crate::countries::ValidationError;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// External data source that can fail during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The country directory feed.
    Directory,
    /// The currency exchange rate feed.
    Rates,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Directory => "directory",
            Source::Rates => "rates",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// One of the external feeds failed (transport, status or decode).
    #[error("Could not fetch data from {provider}")]
    SourceUnavailable { provider: Source },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Summary rendering failed: {0}")]
    Render(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn source_unavailable(provider: Source) -> Self {
        Self::SourceUnavailable { provider }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for failures the caller may retry later without any cleanup.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create connection pool: {0}")]
    PoolCreationFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}
