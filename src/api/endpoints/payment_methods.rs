//! Stored payment method endpoints.
//!
//! - `GET /api/payment-methods` — list own methods
//! - `POST /api/payment-methods` — store one
//! - `PATCH /api/payment-methods/:id` — edit / set default
//! - `DELETE /api/payment-methods/:id` — remove (default promotes the newest
//!   remaining method)

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::{MethodType, PaymentMethod};
use crate::payments::{self, MethodPatch, NewMethod};

#[derive(Serialize)]
pub struct MethodsResponse {
    pub payment_methods: Vec<PaymentMethod>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MethodsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let payment_methods = db::list_payment_methods(&conn, &auth.user_id)?;
    Ok(Json(MethodsResponse { payment_methods }))
}

#[derive(Deserialize)]
pub struct CreateMethodRequest {
    pub method_type: MethodType,
    pub display_name: String,
    pub masked_number: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Serialize)]
pub struct MethodResponse {
    pub payment_method: PaymentMethod,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateMethodRequest>,
) -> Result<Json<MethodResponse>, ApiError> {
    if req.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Display name is required".into()));
    }
    if req.masked_number.trim().is_empty() {
        return Err(ApiError::BadRequest("Masked number is required".into()));
    }

    let mut conn = ctx.open_db()?;
    let payment_method = payments::create_method(
        &mut conn,
        auth.user_id,
        &NewMethod {
            method_type: req.method_type,
            display_name: req.display_name.trim().to_string(),
            masked_number: req.masked_number.trim().to_string(),
            is_default: req.is_default,
        },
    )?;
    Ok(Json(MethodResponse { payment_method }))
}

#[derive(Deserialize)]
pub struct UpdateMethodRequest {
    pub display_name: Option<String>,
    pub masked_number: Option<String>,
    pub is_default: Option<bool>,
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(method_id): Path<Uuid>,
    Json(req): Json<UpdateMethodRequest>,
) -> Result<Json<MethodResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    let payment_method = payments::update_method(
        &mut conn,
        auth.user_id,
        &method_id,
        &MethodPatch {
            display_name: req.display_name,
            masked_number: req.masked_number,
            is_default: req.is_default,
        },
    )?;
    Ok(Json(MethodResponse { payment_method }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(method_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    payments::delete_method(&mut conn, auth.user_id, &method_id)?;
    Ok(Json(DeletedResponse { deleted: true }))
}
