//! Error types for the external feed providers.

use countryxchange_core::{Error, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{provider}: HTTP request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider}: HTTP {status}")]
    Status { provider: String, status: u16 },

    #[error("{provider}: JSON parse error: {message}")]
    Decode { provider: String, message: String },
}

impl SourceError {
    pub fn transport(provider: &str, err: impl ToString) -> Self {
        Self::Transport {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    pub fn status(provider: &str, status: u16) -> Self {
        Self::Status {
            provider: provider.to_string(),
            status,
        }
    }

    pub fn decode(provider: &str, err: impl ToString) -> Self {
        Self::Decode {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    /// Collapses any provider failure into the core `SourceUnavailable` kind.
    pub fn into_core(self, source: Source) -> Error {
        log::warn!("Source '{}' unavailable: {}", source, self);
        Error::source_unavailable(source)
    }
}
