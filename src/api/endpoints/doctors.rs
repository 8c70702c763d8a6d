//! Public doctor catalog endpoints.
//!
//! - `GET /api/doctors` — browse the catalog
//! - `GET /api/doctors/:id` — one doctor with their services

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{Doctor, Service};

#[derive(Serialize)]
pub struct DoctorWithServices {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub services: Vec<Service>,
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<DoctorWithServices>,
}

/// `GET /api/doctors` — all doctors with their services joined.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DoctorsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctors = db::list_doctors(&conn)?
        .into_iter()
        .map(|doctor| {
            let services = db::list_services_by_doctor(&conn, &doctor.id)?;
            Ok(DoctorWithServices { doctor, services })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(DoctorsResponse { doctors }))
}

#[derive(Serialize)]
pub struct DoctorResponse {
    #[serde(flatten)]
    pub doctor: DoctorWithServices,
}

/// `GET /api/doctors/:id` — one doctor.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = db::get_doctor(&conn, &doctor_id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    let services = db::list_services_by_doctor(&conn, &doctor.id)?;

    Ok(Json(DoctorResponse {
        doctor: DoctorWithServices { doctor, services },
    }))
}
