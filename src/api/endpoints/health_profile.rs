//! Health profile endpoints.
//!
//! - `GET /api/health-profile` — read own profile
//! - `POST /api/health-profile` — upsert

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::{HealthProfile, Role};

#[derive(Serialize)]
pub struct HealthProfileResponse {
    pub health_profile: Option<HealthProfile>,
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<HealthProfileResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let health_profile = db::get_health_profile(&conn, &auth.user_id)?;
    Ok(Json(HealthProfileResponse { health_profile }))
}

#[derive(Deserialize)]
pub struct UpsertRequest {
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
}

pub async fn upsert(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpsertRequest>,
) -> Result<Json<HealthProfileResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    if let Some(height) = req.height_cm {
        if !(30.0..=260.0).contains(&height) {
            return Err(ApiError::BadRequest("Implausible height".into()));
        }
    }
    if let Some(weight) = req.weight_kg {
        if !(1.0..=650.0).contains(&weight) {
            return Err(ApiError::BadRequest("Implausible weight".into()));
        }
    }

    let conn = ctx.open_db()?;
    let profile = HealthProfile {
        user_id: auth.user_id,
        blood_type: req.blood_type,
        height_cm: req.height_cm,
        weight_kg: req.weight_kg,
        allergies: req.allergies,
        chronic_conditions: req.chronic_conditions,
        updated_at: Utc::now(),
    };
    db::upsert_health_profile(&conn, &profile)?;
    Ok(Json(HealthProfileResponse {
        health_profile: Some(profile),
    }))
}
