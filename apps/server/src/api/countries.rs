//! Country endpoints: refresh trigger, listing, lookup, delete and the summary image.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::{debug, info, warn};

use countryxchange_core::countries::{Country, CountryFilter};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

const COUNTRY_NOT_FOUND: &str = "Country not found";
const IMAGE_NOT_FOUND: &str = "Summary image not found";

#[derive(Debug, Serialize)]
struct RefreshResponse {
    message: &'static str,
    processed_count: usize,
    last_synced_at: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn refresh_countries(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    info!("Refresh requested");
    let result = state.refresh_service.refresh().await.map_err(|e| {
        warn!("Refresh failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(RefreshResponse {
        message: "refreshed",
        processed_count: result.processed_count,
        last_synced_at: result
            .last_refreshed_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// Strips leading `?` from keys so `/countries??currency=NGN` still filters.
fn normalize_query(raw: HashMap<String, String>) -> HashMap<String, String> {
    raw.into_iter()
        .map(|(key, value)| (key.trim_start_matches('?').to_string(), value))
        .collect()
}

async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Country>>> {
    let mut params = normalize_query(raw);
    let filter = CountryFilter::new(
        params.remove("region"),
        params.remove("currency"),
        params.get("sort").map(String::as_str),
    );
    debug!("Listing countries with {:?}", filter);
    let countries = state.repository.list_countries(&filter)?;
    Ok(Json(countries))
}

async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Country>> {
    let country = state
        .repository
        .get_country(&name)
        .map_err(|e| ApiError::from_core(e, COUNTRY_NOT_FOUND))?;
    Ok(Json(country))
}

async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.repository.delete_country(&name).await? {
        return Err(ApiError::NotFound(COUNTRY_NOT_FOUND));
    }
    info!("Deleted country '{}'", name);
    Ok(Json(MessageResponse { message: "deleted" }))
}

async fn get_summary_image(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let path = &state.config.summary_image_path;
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No summary image at {}", path.display());
            Err(ApiError::NotFound(IMAGE_NOT_FOUND))
        }
        Err(e) => Err(ApiError::Internal(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries/refresh", post(refresh_countries))
        .route("/countries", get(list_countries))
        .route("/countries/image", get(get_summary_image))
        .route("/countries/:name", get(get_country).delete(delete_country))
}
