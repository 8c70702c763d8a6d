//! Auth endpoints.
//!
//! - `POST /api/auth/register` — create a patient account
//! - `POST /api/auth/login` — issue a bearer token
//! - `POST /api/auth/logout` — revoke the current token
//! - `GET /api/me` / `PATCH /api/me` — profile read/update

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::{self, Registration};
use crate::db;
use crate::models::{Role, User};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let trimmed = email.trim();
    let well_formed = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !well_formed {
        return Err(ApiError::BadRequest("Invalid email address".into()));
    }
    Ok(())
}

/// `POST /api/auth/register` — create a patient account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_email(&req.email)?;
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    let conn = ctx.open_db()?;
    let user = auth::register_patient(
        &conn,
        &Registration {
            email: req.email,
            password: req.password,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone: req.phone,
            birth_date: req.birth_date,
        },
    )?;

    Ok(Json(UserResponse { user }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Role,
    pub user: User,
}

/// `POST /api/auth/login` — verify credentials, issue a token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let (user, token, expires_at) =
        auth::login(&conn, &req.email, &req.password, ctx.config.token_ttl)?;

    Ok(Json(LoginResponse {
        token,
        expires_at,
        role: user.role,
        user,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// `POST /api/auth/logout` — revoke the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let conn = ctx.open_db()?;
    auth::logout(&conn, token)?;
    Ok(Json(LogoutResponse { logged_out: true }))
}

/// `GET /api/me` — the caller's own user row.
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let user = db::get_user(&conn, &auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse { user }))
}

#[derive(Deserialize)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// `PATCH /api/me` — update profile fields.
pub async fn update_me(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let current = db::get_user(&conn, &auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let first_name = patch.first_name.unwrap_or(current.first_name);
    let last_name = patch.last_name.unwrap_or(current.last_name);
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".into()));
    }
    let phone = patch.phone.or(current.phone);
    let birth_date = patch.birth_date.or(current.birth_date);

    db::update_user_profile(
        &conn,
        &auth.user_id,
        first_name.trim(),
        last_name.trim(),
        phone.as_deref(),
        birth_date,
    )?;

    let user = db::get_user(&conn, &auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse { user }))
}
