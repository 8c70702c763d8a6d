//! Payment ledger — settling pending payments and the stored-method default
//! invariant.
//!
//! Settlement is a simulated synchronous state flip, not a gateway call: the
//! payment goes to completed with a generated transaction id, and a
//! still-pending referenced appointment advances to confirmed, all in one
//! transaction.
//! Default-method maintenance (clear + set, delete + promote) is likewise
//! transactional so a user always ends up with at most one default.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{AppointmentStatus, MethodType, Payment, PaymentMethod, PaymentStatus};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment method not found")]
    MethodNotFound,

    #[error("Payment is already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Settle a pending payment with one of the owner's stored methods.
pub fn settle_payment(
    conn: &mut Connection,
    user_id: Uuid,
    payment_id: &Uuid,
    method_id: &Uuid,
) -> Result<Payment, PaymentError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let mut payment = db::get_payment(&tx, payment_id)?.ok_or(PaymentError::PaymentNotFound)?;
    if payment.patient_id != user_id {
        return Err(PaymentError::PaymentNotFound);
    }
    if payment.status == PaymentStatus::Completed {
        return Err(PaymentError::AlreadyCompleted);
    }

    let method = db::get_payment_method(&tx, method_id)?.ok_or(PaymentError::MethodNotFound)?;
    if method.user_id != user_id {
        return Err(PaymentError::MethodNotFound);
    }

    let transaction_id = Uuid::new_v4().to_string();
    db::mark_payment_completed(&tx, payment_id, method.method_type, &transaction_id)?;
    if let Some(appointment_id) = payment.appointment_id {
        // Only a still-pending appointment advances; paying must not
        // resurrect one cancelled in the meantime.
        let appointment =
            db::get_appointment(&tx, &appointment_id)?.ok_or(PaymentError::PaymentNotFound)?;
        if appointment.status == AppointmentStatus::Pending {
            db::update_appointment_status(&tx, &appointment_id, AppointmentStatus::Confirmed)?;
        }
    }

    tx.commit().map_err(DatabaseError::from)?;

    payment.status = PaymentStatus::Completed;
    payment.method_type = Some(method.method_type);
    payment.transaction_id = Some(transaction_id);
    tracing::info!(payment_id = %payment.id, amount = payment.amount, "payment settled");
    Ok(payment)
}

#[derive(Debug, Clone)]
pub struct NewMethod {
    pub method_type: MethodType,
    pub display_name: String,
    pub masked_number: String,
    pub is_default: bool,
}

/// Store a payment method. When flagged default, every other method the user
/// owns loses the flag in the same transaction.
pub fn create_method(
    conn: &mut Connection,
    user_id: Uuid,
    new: &NewMethod,
) -> Result<PaymentMethod, PaymentError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    // First stored method becomes the default regardless of the flag
    let is_default = new.is_default || db::list_payment_methods(&tx, &user_id)?.is_empty();
    if is_default {
        db::clear_default_methods(&tx, &user_id)?;
    }

    let method = PaymentMethod {
        id: Uuid::new_v4(),
        user_id,
        method_type: new.method_type,
        display_name: new.display_name.clone(),
        masked_number: new.masked_number.clone(),
        is_default,
        created_at: Utc::now(),
    };
    db::insert_payment_method(&tx, &method)?;

    tx.commit().map_err(DatabaseError::from)?;
    Ok(method)
}

#[derive(Debug, Clone, Default)]
pub struct MethodPatch {
    pub display_name: Option<String>,
    pub masked_number: Option<String>,
    pub is_default: Option<bool>,
}

pub fn update_method(
    conn: &mut Connection,
    user_id: Uuid,
    method_id: &Uuid,
    patch: &MethodPatch,
) -> Result<PaymentMethod, PaymentError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let method = db::get_payment_method(&tx, method_id)?.ok_or(PaymentError::MethodNotFound)?;
    if method.user_id != user_id {
        return Err(PaymentError::MethodNotFound);
    }

    let display_name = patch.display_name.as_deref().unwrap_or(&method.display_name);
    let masked_number = patch
        .masked_number
        .as_deref()
        .unwrap_or(&method.masked_number);
    db::update_payment_method(&tx, method_id, display_name, masked_number)?;

    if patch.is_default == Some(true) && !method.is_default {
        db::clear_default_methods(&tx, &user_id)?;
        db::set_default_method(&tx, method_id)?;
    }

    tx.commit().map_err(DatabaseError::from)?;

    let updated = db::get_payment_method(conn, method_id)?.ok_or(PaymentError::MethodNotFound)?;
    Ok(updated)
}

/// Delete a stored method. Removing the default promotes the most recently
/// created remaining method, if any, inside the same transaction.
pub fn delete_method(
    conn: &mut Connection,
    user_id: Uuid,
    method_id: &Uuid,
) -> Result<(), PaymentError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let method = db::get_payment_method(&tx, method_id)?.ok_or(PaymentError::MethodNotFound)?;
    if method.user_id != user_id {
        return Err(PaymentError::MethodNotFound);
    }

    db::delete_payment_method(&tx, method_id)?;
    if method.is_default {
        if let Some(next) = db::newest_payment_method(&tx, &user_id)? {
            db::set_default_method(&tx, &next.id)?;
        }
    }

    tx.commit().map_err(DatabaseError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::booking::{create_appointment, BookingRequest};
    use crate::db::repository::test_support::*;
    use crate::db::repository::{count_default_methods, get_appointment, get_payment};
    use crate::models::Role;

    fn card(name: &str, is_default: bool) -> NewMethod {
        NewMethod {
            method_type: MethodType::Card,
            display_name: name.to_string(),
            masked_number: "**** 4242".to_string(),
            is_default,
        }
    }

    fn booked_payment(conn: &mut Connection, user_id: Uuid, amount: i64) -> (Uuid, Payment) {
        let doctor = make_doctor(conn, None);
        let service = make_service(conn, doctor.id, amount);
        let outcome = create_appointment(
            conn,
            user_id,
            &BookingRequest {
                doctor_id: doctor.id,
                service_id: Some(service.id),
                date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
                time_slot: "10:00".to_string(),
            },
        )
        .unwrap();
        (outcome.appointment.id, outcome.payment.unwrap())
    }

    #[test]
    fn settle_flips_payment_and_confirms_appointment() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let (appointment_id, payment) = booked_payment(&mut conn, patient.id, 5000);
        let method = create_method(&mut conn, patient.id, &card("Visa", true)).unwrap();

        let settled = settle_payment(&mut conn, patient.id, &payment.id, &method.id).unwrap();
        assert_eq!(settled.status, PaymentStatus::Completed);
        assert_eq!(settled.method_type, Some(MethodType::Card));
        assert!(settled.transaction_id.is_some());

        let stored = get_payment(&conn, &payment.id).unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);

        let appt = get_appointment(&conn, &appointment_id).unwrap().unwrap();
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn settle_leaves_cancelled_appointment_cancelled() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let (appointment_id, payment) = booked_payment(&mut conn, patient.id, 5000);
        let method = create_method(&mut conn, patient.id, &card("Visa", true)).unwrap();

        crate::booking::update_status(
            &conn,
            crate::booking::Actor::Patient(patient.id),
            &appointment_id,
            AppointmentStatus::Cancelled,
        )
        .unwrap();

        let settled = settle_payment(&mut conn, patient.id, &payment.id, &method.id).unwrap();
        assert_eq!(settled.status, PaymentStatus::Completed);

        let appt = get_appointment(&conn, &appointment_id).unwrap().unwrap();
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn settling_twice_is_a_conflict() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let (_, payment) = booked_payment(&mut conn, patient.id, 5000);
        let method = create_method(&mut conn, patient.id, &card("Visa", true)).unwrap();

        settle_payment(&mut conn, patient.id, &payment.id, &method.id).unwrap();
        let err = settle_payment(&mut conn, patient.id, &payment.id, &method.id).unwrap_err();
        assert!(matches!(err, PaymentError::AlreadyCompleted));
    }

    #[test]
    fn settle_rejects_foreign_payment_and_method() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let rival = make_user(&conn, "rival@example.org", Role::Patient);
        let (_, payment) = booked_payment(&mut conn, patient.id, 5000);
        let own_method = create_method(&mut conn, patient.id, &card("Visa", true)).unwrap();
        let rival_method = create_method(&mut conn, rival.id, &card("Amex", true)).unwrap();

        let err = settle_payment(&mut conn, rival.id, &payment.id, &rival_method.id).unwrap_err();
        assert!(matches!(err, PaymentError::PaymentNotFound));

        let err = settle_payment(&mut conn, patient.id, &payment.id, &rival_method.id).unwrap_err();
        assert!(matches!(err, PaymentError::MethodNotFound));

        // Nothing changed
        let stored = get_payment(&conn, &payment.id).unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
        let _ = own_method;
    }

    #[test]
    fn first_method_becomes_default_implicitly() {
        let mut conn = test_db();
        let user = make_user(&conn, "pat@example.org", Role::Patient);
        let method = create_method(&mut conn, user.id, &card("Visa", false)).unwrap();
        assert!(method.is_default);
    }

    #[test]
    fn exactly_one_default_after_any_set() {
        let mut conn = test_db();
        let user = make_user(&conn, "pat@example.org", Role::Patient);
        let first = create_method(&mut conn, user.id, &card("Visa", true)).unwrap();
        let second = create_method(&mut conn, user.id, &card("Amex", true)).unwrap();
        assert_eq!(count_default_methods(&conn, &user.id).unwrap(), 1);

        update_method(
            &mut conn,
            user.id,
            &first.id,
            &MethodPatch {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(count_default_methods(&conn, &user.id).unwrap(), 1);
        let refreshed = db::get_payment_method(&conn, &second.id).unwrap().unwrap();
        assert!(!refreshed.is_default);
    }

    #[test]
    fn deleting_default_promotes_newest_remaining() {
        let mut conn = test_db();
        let user = make_user(&conn, "pat@example.org", Role::Patient);
        let oldest = create_method(&mut conn, user.id, &card("Visa", false)).unwrap();
        // Force distinct creation order for the promotion query
        conn.execute(
            "UPDATE payment_methods SET created_at = '2026-01-01T00:00:00Z' WHERE id = ?1",
            rusqlite::params![oldest.id.to_string()],
        )
        .unwrap();
        let newest = create_method(&mut conn, user.id, &card("Amex", false)).unwrap();

        // oldest is still the default (it was first)
        let default_holder = db::get_payment_method(&conn, &oldest.id).unwrap().unwrap();
        assert!(default_holder.is_default);

        delete_method(&mut conn, user.id, &oldest.id).unwrap();
        let promoted = db::get_payment_method(&conn, &newest.id).unwrap().unwrap();
        assert!(promoted.is_default);
        assert_eq!(count_default_methods(&conn, &user.id).unwrap(), 1);
    }

    #[test]
    fn deleting_non_default_leaves_default_alone() {
        let mut conn = test_db();
        let user = make_user(&conn, "pat@example.org", Role::Patient);
        let default = create_method(&mut conn, user.id, &card("Visa", true)).unwrap();
        let spare = create_method(&mut conn, user.id, &card("Amex", false)).unwrap();

        delete_method(&mut conn, user.id, &spare.id).unwrap();
        let kept = db::get_payment_method(&conn, &default.id).unwrap().unwrap();
        assert!(kept.is_default);
    }
}
