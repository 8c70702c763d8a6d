//! Booking endpoints.
//!
//! - `GET /api/appointments` — patient's own appointments, newest date first
//! - `POST /api/appointments` — book (and create the pending payment when a
//!   service is attached)
//! - `PATCH /api/appointments` — patient cancels an own appointment
//! - `GET /api/appointments/availability` — taken slots for a doctor and day
//! - `GET /api/doctor/appointments` — doctor's queue, oldest first
//! - `PATCH /api/doctor/appointments` — doctor confirms/completes/cancels

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::booking::{self, Actor, BookingRequest};
use crate::db;
use crate::models::{Appointment, AppointmentDetail, AppointmentStatus, Payment, Role};

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentDetail>,
}

/// `GET /api/appointments` — the patient's own appointments.
pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let appointments = db::list_appointments_by_patient(&conn, &auth.user_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_slot: String,
}

#[derive(Serialize)]
pub struct CreateAppointmentResponse {
    pub appointment: Appointment,
    pub payment: Option<Payment>,
}

/// `POST /api/appointments` — book a slot.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<Json<CreateAppointmentResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    if req.time_slot.trim().is_empty() {
        return Err(ApiError::BadRequest("Time slot is required".into()));
    }

    let mut conn = ctx.open_db()?;
    let outcome = booking::create_appointment(
        &mut conn,
        auth.user_id,
        &BookingRequest {
            doctor_id: req.doctor_id,
            service_id: req.service_id,
            date: req.date,
            time_slot: req.time_slot.trim().to_string(),
        },
    )?;

    Ok(Json(CreateAppointmentResponse {
        appointment: outcome.appointment,
        payment: outcome.payment,
    }))
}

#[derive(Deserialize)]
pub struct StatusPatch {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
}

/// `PATCH /api/appointments` — patient-side status change (cancel).
pub async fn update_mine(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let appointment = booking::update_status(
        &conn,
        Actor::Patient(auth.user_id),
        &patch.appointment_id,
        patch.status,
    )?;
    Ok(Json(AppointmentResponse { appointment }))
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub taken_slots: Vec<String>,
}

/// `GET /api/appointments/availability?doctor_id&date` — slots already taken.
///
/// A filter, not a reservation: the unique index on active slots is what
/// actually arbitrates concurrent bookings.
pub async fn availability(
    State(ctx): State<ApiContext>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::get_doctor(&conn, &query.doctor_id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    let taken_slots = db::taken_slots(&conn, &query.doctor_id, query.date)?;
    Ok(Json(AvailabilityResponse {
        doctor_id: query.doctor_id,
        date: query.date,
        taken_slots,
    }))
}

/// `GET /api/doctor/appointments` — the doctor's queue.
pub async fn list_for_doctor(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    let appointments = db::list_appointments_by_doctor(&conn, &doctor.id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `PATCH /api/doctor/appointments` — doctor-side status change.
pub async fn update_for_doctor(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    let appointment = booking::update_status(
        &conn,
        Actor::Doctor(doctor.id),
        &patch.appointment_id,
        patch.status,
    )?;
    Ok(Json(AppointmentResponse { appointment }))
}
