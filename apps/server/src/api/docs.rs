//! Machine-readable API description, served outside production.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::config::DocsConfig;
use crate::main_lib::AppState;

fn error_ref() -> Value {
    json!({ "$ref": "#/definitions/ErrorResponse" })
}

/// Swagger 2.0 document with host and schemes taken from the config.
pub fn api_document(docs: &DocsConfig) -> Value {
    json!({
        "swagger": "2.0",
        "info": {
            "title": "Country Xchange API",
            "description": "Country information with currency exchange rates and estimated GDP.",
            "version": env!("CARGO_PKG_VERSION"),
            "license": { "name": "MIT License", "url": "https://opensource.org/licenses/MIT" }
        },
        "host": docs.host.clone().unwrap_or_default(),
        "schemes": docs.schemes,
        "basePath": "/",
        "paths": {
            "/countries/refresh": {
                "post": {
                    "tags": ["countries"],
                    "summary": "Refresh country data from the external feeds",
                    "produces": ["application/json"],
                    "responses": {
                        "200": { "description": "OK", "schema": { "$ref": "#/definitions/RefreshResponse" } },
                        "503": { "description": "External data source unavailable", "schema": error_ref() },
                        "500": { "description": "Internal server error", "schema": error_ref() }
                    }
                }
            },
            "/countries": {
                "get": {
                    "tags": ["countries"],
                    "summary": "List countries",
                    "produces": ["application/json"],
                    "parameters": [
                        { "name": "region", "in": "query", "type": "string", "description": "Case-insensitive region filter" },
                        { "name": "currency", "in": "query", "type": "string", "description": "Case-insensitive currency code filter" },
                        { "name": "sort", "in": "query", "type": "string", "enum": ["gdp_desc", "gdp_asc"] }
                    ],
                    "responses": {
                        "200": { "description": "OK", "schema": { "type": "array", "items": { "$ref": "#/definitions/Country" } } },
                        "500": { "description": "Internal server error", "schema": error_ref() }
                    }
                }
            },
            "/countries/image": {
                "get": {
                    "tags": ["countries"],
                    "summary": "Summary image of the last refresh",
                    "produces": ["image/png"],
                    "responses": {
                        "200": { "description": "PNG image" },
                        "404": { "description": "Summary image not found", "schema": error_ref() }
                    }
                }
            },
            "/countries/{name}": {
                "parameters": [ { "name": "name", "in": "path", "required": true, "type": "string" } ],
                "get": {
                    "tags": ["countries"],
                    "summary": "Get a country by name (case-insensitive)",
                    "produces": ["application/json"],
                    "responses": {
                        "200": { "description": "OK", "schema": { "$ref": "#/definitions/Country" } },
                        "404": { "description": "Country not found", "schema": error_ref() }
                    }
                },
                "delete": {
                    "tags": ["countries"],
                    "summary": "Delete a country by name (case-insensitive)",
                    "produces": ["application/json"],
                    "responses": {
                        "200": { "description": "Deleted" },
                        "404": { "description": "Country not found", "schema": error_ref() }
                    }
                }
            },
            "/status": {
                "get": {
                    "tags": ["status"],
                    "summary": "Record count and last refresh time",
                    "produces": ["application/json"],
                    "responses": {
                        "200": { "description": "OK", "schema": { "$ref": "#/definitions/StatusResponse" } }
                    }
                }
            },
            "/health": {
                "get": {
                    "tags": ["status"],
                    "summary": "Liveness check",
                    "produces": ["text/plain"],
                    "responses": { "200": { "description": "Service is up and running" } }
                }
            }
        },
        "definitions": {
            "Country": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "name": { "type": "string" },
                    "capital": { "type": "string" },
                    "region": { "type": "string" },
                    "population": { "type": "integer" },
                    "currency_code": { "type": "string" },
                    "exchange_rate": { "type": "number" },
                    "estimated_gdp": { "type": "number" },
                    "flag_url": { "type": "string" },
                    "last_refreshed_at": { "type": "string", "format": "date-time" }
                }
            },
            "RefreshResponse": {
                "type": "object",
                "properties": {
                    "message": { "type": "string", "example": "refreshed" },
                    "processed_count": { "type": "integer" },
                    "last_synced_at": { "type": "string", "format": "date-time" }
                }
            },
            "StatusResponse": {
                "type": "object",
                "properties": {
                    "total_count": { "type": "integer" },
                    "last_synced_at": { "type": "string", "format": "date-time", "x-nullable": true }
                }
            },
            "ErrorResponse": {
                "type": "object",
                "properties": {
                    "error": { "type": "string" },
                    "details": {}
                }
            }
        }
    })
}

async fn get_api_document(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(api_document(&state.config.docs))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/docs/openapi.json", get(get_api_document))
}
