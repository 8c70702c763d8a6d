//! Payment endpoints.
//!
//! - `GET /api/payments` — the caller's payments
//! - `POST /api/payments/pay` — settle a pending payment
//! - `GET /api/doctor/payments?appointment_id` — payment for one of the
//!   doctor's own appointments

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::Payment;
use crate::payments;

#[derive(Serialize)]
pub struct PaymentsResponse {
    pub payments: Vec<Payment>,
}

/// `GET /api/payments` — list own payments, newest first.
pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PaymentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let payments = db::list_payments_by_patient(&conn, &auth.user_id)?;
    Ok(Json(PaymentsResponse { payments }))
}

#[derive(Deserialize)]
pub struct PayRequest {
    pub payment_id: Uuid,
    pub payment_method_id: Uuid,
}

#[derive(Serialize)]
pub struct PayResponse {
    pub payment: Payment,
}

/// `POST /api/payments/pay` — settle a pending payment with an owned method.
pub async fn pay(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<PayRequest>,
) -> Result<Json<PayResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    let payment = payments::settle_payment(
        &mut conn,
        auth.user_id,
        &req.payment_id,
        &req.payment_method_id,
    )?;
    Ok(Json(PayResponse { payment }))
}

#[derive(Deserialize)]
pub struct DoctorPaymentQuery {
    pub appointment_id: Uuid,
}

/// `GET /api/doctor/payments?appointment_id` — view a payment attached to one
/// of the calling doctor's appointments.
pub async fn for_doctor(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DoctorPaymentQuery>,
) -> Result<Json<PayResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;

    let appointment = db::get_appointment(&conn, &query.appointment_id)?
        .filter(|a| a.doctor_id == doctor.id)
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;

    let payment = db::get_payment_by_appointment(&conn, &appointment.id)?
        .ok_or_else(|| ApiError::NotFound("No payment for this appointment".into()))?;
    Ok(Json(PayResponse { payment }))
}
