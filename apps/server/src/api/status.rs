use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Debug, Serialize)]
struct StatusResponse {
    total_count: i64,
    last_synced_at: Option<String>,
}

async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    let total_count = state.repository.count_countries()?;
    let last_synced_at = state
        .repository
        .get_last_refreshed_at()?
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true));
    Ok(Json(StatusResponse {
        total_count,
        last_synced_at,
    }))
}

async fn health() -> &'static str {
    "Service is up and running"
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(get_status))
        .route("/health", get(health))
}
