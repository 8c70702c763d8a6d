//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health` — connection and database check.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    // Opening the store validates the schema as a side effect
    ctx.open_db()?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
    }))
}
