//! HTTP error responses.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use countryxchange_core::Error as CoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Carries the message naming the unavailable feed.
    #[error("{0}")]
    SourceUnavailable(String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    /// Carries the client-facing message, e.g. "Country not found".
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a core error, using `not_found` as the message for `NotFound`.
    pub fn from_core(err: CoreError, not_found: &'static str) -> Self {
        match err {
            CoreError::NotFound(_) => ApiError::NotFound(not_found),
            other => other.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SourceUnavailable { .. } => ApiError::SourceUnavailable(err.to_string()),
            CoreError::Validation(v) => ApiError::Validation(v.errors),
            CoreError::NotFound(_) => ApiError::NotFound("Not found"),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::SourceUnavailable(details) => ErrorBody {
                error: "External data source unavailable".to_string(),
                details: Some(Value::String(details)),
            },
            ApiError::Validation(fields) => ErrorBody {
                error: "Validation failed".to_string(),
                details: serde_json::to_value(fields).ok(),
            },
            ApiError::NotFound(message) => ErrorBody {
                error: message.to_string(),
                details: None,
            },
            ApiError::Internal(message) => {
                // Details stay in the log; clients get a generic body.
                error!("Internal error: {}", message);
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
