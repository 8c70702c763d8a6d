//! Booking workflow — appointment creation, status transitions, availability.
//!
//! Creation runs in one transaction: the appointment insert plus, when a
//! service is attached, the matching pending payment. The partial unique index
//! on (doctor_id, date, time_slot) for non-cancelled rows is the backstop
//! against concurrent double-booking; a violation surfaces as `SlotTaken`.

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Appointment, AppointmentStatus, Payment, PaymentStatus, Role};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor is not taking appointments")]
    DoctorUnavailable,

    #[error("Service not found for this doctor")]
    ServiceNotFound,

    #[error("Slot {slot} on {date} is already booked")]
    SlotTaken { date: NaiveDate, slot: String },

    #[error("Cannot change a {from} appointment to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: Uuid,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_slot: String,
}

/// What a successful booking produced.
#[derive(Debug)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    pub payment: Option<Payment>,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy)]
pub enum Actor {
    /// Acting user id.
    Patient(Uuid),
    /// Resolved doctor row id.
    Doctor(Uuid),
}

/// Book an appointment, and its pending payment when a service is attached.
pub fn create_appointment(
    conn: &mut Connection,
    patient_id: Uuid,
    request: &BookingRequest,
) -> Result<BookingOutcome, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let doctor =
        db::get_doctor(&tx, &request.doctor_id)?.ok_or(BookingError::DoctorNotFound)?;
    if !doctor.available {
        return Err(BookingError::DoctorUnavailable);
    }

    let service = match request.service_id {
        Some(service_id) => {
            let service =
                db::get_service(&tx, &service_id)?.ok_or(BookingError::ServiceNotFound)?;
            if service.doctor_id != doctor.id {
                return Err(BookingError::ServiceNotFound);
            }
            Some(service)
        }
        None => None,
    };

    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id: doctor.id,
        service_id: service.as_ref().map(|s| s.id),
        date: request.date,
        time_slot: request.time_slot.clone(),
        status: AppointmentStatus::Pending,
        created_at: Utc::now(),
    };
    match db::insert_appointment(&tx, &appointment) {
        Ok(()) => {}
        Err(DatabaseError::ConstraintViolation(_)) => {
            return Err(BookingError::SlotTaken {
                date: request.date,
                slot: request.time_slot.clone(),
            });
        }
        Err(e) => return Err(e.into()),
    }

    let payment = match &service {
        Some(service) => {
            let payment = Payment {
                id: Uuid::new_v4(),
                patient_id,
                appointment_id: Some(appointment.id),
                amount: service.price,
                status: PaymentStatus::Pending,
                method_type: None,
                transaction_id: None,
                created_at: Utc::now(),
            };
            db::insert_payment(&tx, &payment)?;
            Some(payment)
        }
        None => None,
    };

    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %doctor.id,
        date = %appointment.date,
        slot = %appointment.time_slot,
        "appointment booked"
    );
    Ok(BookingOutcome {
        appointment,
        payment,
    })
}

/// Which transitions each role may perform.
pub fn transition_allowed(role: Role, from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    match role {
        Role::Patient => matches!((from, to), (Pending | Confirmed, Cancelled)),
        Role::Doctor => matches!(
            (from, to),
            (Pending, Confirmed)
                | (Pending | Confirmed, Cancelled)
                | (Pending | Confirmed, Completed)
        ),
        Role::Admin => false,
    }
}

/// Apply a status change on behalf of an actor. An appointment the actor does
/// not own reads as absent — never a silent success.
pub fn update_status(
    conn: &Connection,
    actor: Actor,
    appointment_id: &Uuid,
    to: AppointmentStatus,
) -> Result<Appointment, BookingError> {
    let mut appointment =
        db::get_appointment(conn, appointment_id)?.ok_or(BookingError::AppointmentNotFound)?;

    let role = match actor {
        Actor::Patient(user_id) => {
            if appointment.patient_id != user_id {
                return Err(BookingError::AppointmentNotFound);
            }
            Role::Patient
        }
        Actor::Doctor(doctor_id) => {
            if appointment.doctor_id != doctor_id {
                return Err(BookingError::AppointmentNotFound);
            }
            Role::Doctor
        }
    };

    if !transition_allowed(role, appointment.status, to) {
        return Err(BookingError::InvalidTransition {
            from: appointment.status.as_str(),
            to: to.as_str(),
        });
    }

    db::update_appointment_status(conn, appointment_id, to)?;
    appointment.status = to;
    tracing::info!(appointment_id = %appointment.id, status = to.as_str(), "appointment status changed");
    Ok(appointment)
}
