//! Maintenance endpoints, mounted outside production only.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiResult;
use crate::main_lib::AppState;

async fn drop_tables(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    warn!("Dropping all country tables");
    state.repository.drop_tables().await?;
    Ok(Json(json!({ "message": "Tables dropped successfully" })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/admin/drop-tables", post(drop_tables))
}
