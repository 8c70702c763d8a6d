//! Doctor-owned service management.
//!
//! - `GET /api/doctor/services` — list own services
//! - `POST /api/doctor/services` — create
//! - `PATCH /api/doctor/services/:id` — edit
//! - `DELETE /api/doctor/services/:id` — remove
//!
//! All four resolve the caller's doctor row and re-check ownership by id
//! comparison; a foreign service reads as absent.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::Service;

#[derive(Serialize)]
pub struct ServicesResponse {
    pub services: Vec<Service>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ServicesResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    let services = db::list_services_by_doctor(&conn, &doctor.id)?;
    Ok(Json(ServicesResponse { services }))
}

#[derive(Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub price: i64,
    pub duration_minutes: u32,
}

fn validate_service(req: &ServiceRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Service name is required".into()));
    }
    if req.price < 0 {
        return Err(ApiError::BadRequest("Price cannot be negative".into()));
    }
    if req.duration_minutes == 0 {
        return Err(ApiError::BadRequest("Duration must be positive".into()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub service: Service,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ServiceRequest>,
) -> Result<Json<ServiceResponse>, ApiError> {
    validate_service(&req)?;
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;

    let service = Service {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        name: req.name.trim().to_string(),
        price: req.price,
        duration_minutes: req.duration_minutes,
    };
    db::insert_service(&conn, &service)?;
    Ok(Json(ServiceResponse { service }))
}

/// Load a service and verify the doctor owns it; absent or foreign → NotFound.
fn owned_service(
    conn: &rusqlite::Connection,
    doctor_id: &Uuid,
    service_id: &Uuid,
) -> Result<Service, ApiError> {
    let service = db::get_service(conn, service_id)?
        .filter(|s| s.doctor_id == *doctor_id)
        .ok_or_else(|| ApiError::NotFound("Service not found".into()))?;
    Ok(service)
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(service_id): Path<Uuid>,
    Json(req): Json<ServiceRequest>,
) -> Result<Json<ServiceResponse>, ApiError> {
    validate_service(&req)?;
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    owned_service(&conn, &doctor.id, &service_id)?;

    db::update_service(
        &conn,
        &service_id,
        req.name.trim(),
        req.price,
        req.duration_minutes,
    )?;
    let service = owned_service(&conn, &doctor.id, &service_id)?;
    Ok(Json(ServiceResponse { service }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    owned_service(&conn, &doctor.id, &service_id)?;

    db::delete_service(&conn, &service_id)?;
    Ok(Json(DeletedResponse { deleted: true }))
}
