//! Favorite-doctor endpoints.
//!
//! - `GET /api/favorites` — favorited doctors
//! - `POST /api/favorites` — toggle (presence = favorited)

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::{Doctor, Role};

#[derive(Serialize)]
pub struct FavoritesResponse {
    pub doctors: Vec<Doctor>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let doctors = db::list_favorite_doctors(&conn, &auth.user_id)?;
    Ok(Json(FavoritesResponse { doctors }))
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub doctor_id: Uuid,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub doctor_id: Uuid,
    pub favorited: bool,
}

/// Toggle: insert when absent, remove when present.
pub async fn toggle(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    db::get_doctor(&conn, &req.doctor_id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;

    let favorited = if db::favorite_exists(&conn, &auth.user_id, &req.doctor_id)? {
        db::delete_favorite(&conn, &auth.user_id, &req.doctor_id)?;
        false
    } else {
        db::insert_favorite(&conn, &auth.user_id, &req.doctor_id)?;
        true
    };

    Ok(Json(ToggleResponse {
        doctor_id: req.doctor_id,
        favorited,
    }))
}
