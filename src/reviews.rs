//! Review subsystem — one review per completed appointment, plus the doctor's
//! denormalized aggregate rating.
//!
//! `recompute_doctor_rating` is the only writer of `doctors.rating`; it runs
//! inside the review-creation transaction so the cached mean can never drift
//! from the review rows.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{AppointmentStatus, Review};

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Appointment is not completed yet")]
    NotCompleted,

    #[error("Appointment already has a review")]
    AlreadyReviewed,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Create a review for one of the caller's completed appointments and refresh
/// the doctor's aggregate rating.
pub fn create_review(
    conn: &mut Connection,
    patient_id: Uuid,
    appointment_id: &Uuid,
    rating: u8,
    comment: Option<String>,
) -> Result<Review, ReviewError> {
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::InvalidRating);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let appointment =
        db::get_appointment(&tx, appointment_id)?.ok_or(ReviewError::AppointmentNotFound)?;
    if appointment.patient_id != patient_id {
        return Err(ReviewError::AppointmentNotFound);
    }
    if appointment.status != AppointmentStatus::Completed {
        return Err(ReviewError::NotCompleted);
    }

    let review = Review {
        id: Uuid::new_v4(),
        appointment_id: *appointment_id,
        patient_id,
        doctor_id: appointment.doctor_id,
        rating,
        comment,
        created_at: Utc::now(),
    };
    match db::insert_review(&tx, &review) {
        Ok(()) => {}
        Err(DatabaseError::ConstraintViolation(_)) => return Err(ReviewError::AlreadyReviewed),
        Err(e) => return Err(e.into()),
    }

    recompute_doctor_rating(&tx, &appointment.doctor_id)?;

    tx.commit().map_err(DatabaseError::from)?;
    tracing::info!(doctor_id = %review.doctor_id, rating, "review recorded");
    Ok(review)
}

/// Recompute and persist the mean rating for a doctor. Unreviewed doctors
/// read as 0.0.
pub fn recompute_doctor_rating(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<f64, DatabaseError> {
    let mean = db::mean_rating(conn, doctor_id)?.unwrap_or(0.0);
    db::update_doctor_rating(conn, doctor_id, mean)?;
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::repository::test_support::*;
    use crate::db::repository::{get_doctor, update_appointment_status};
    use crate::models::Role;

    fn completed_appointment(conn: &Connection, patient_id: Uuid, doctor_id: Uuid) -> Uuid {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let slot = format!("{}:00", 8 + count(conn));
        let appt = make_appointment(conn, patient_id, doctor_id, None, date, &slot);
        update_appointment_status(conn, &appt.id, AppointmentStatus::Completed).unwrap();
        appt.id
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM appointments", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn review_updates_doctor_mean_rating() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let doctor = make_doctor(&conn, None);

        let first = completed_appointment(&conn, patient.id, doctor.id);
        create_review(&mut conn, patient.id, &first, 5, Some("great".into())).unwrap();
        assert_eq!(get_doctor(&conn, &doctor.id).unwrap().unwrap().rating, 5.0);

        let second = completed_appointment(&conn, patient.id, doctor.id);
        create_review(&mut conn, patient.id, &second, 2, None).unwrap();
        assert_eq!(get_doctor(&conn, &doctor.id).unwrap().unwrap().rating, 3.5);
    }

    #[test]
    fn second_review_is_conflict_and_rating_unchanged() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let doctor = make_doctor(&conn, None);
        let appt = completed_appointment(&conn, patient.id, doctor.id);

        create_review(&mut conn, patient.id, &appt, 4, None).unwrap();
        let err = create_review(&mut conn, patient.id, &appt, 1, None).unwrap_err();
        assert!(matches!(err, ReviewError::AlreadyReviewed));
        assert_eq!(get_doctor(&conn, &doctor.id).unwrap().unwrap().rating, 4.0);
    }

    #[test]
    fn uncompleted_appointment_cannot_be_reviewed() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let doctor = make_doctor(&conn, None);
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let appt = make_appointment(&conn, patient.id, doctor.id, None, date, "09:00");

        let err = create_review(&mut conn, patient.id, &appt.id, 5, None).unwrap_err();
        assert!(matches!(err, ReviewError::NotCompleted));
    }

    #[test]
    fn foreign_appointment_reads_as_absent() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let rival = make_user(&conn, "rival@example.org", Role::Patient);
        let doctor = make_doctor(&conn, None);
        let appt = completed_appointment(&conn, patient.id, doctor.id);

        let err = create_review(&mut conn, rival.id, &appt, 5, None).unwrap_err();
        assert!(matches!(err, ReviewError::AppointmentNotFound));
    }

    #[test]
    fn out_of_range_rating_rejected() {
        let mut conn = test_db();
        let patient = make_user(&conn, "pat@example.org", Role::Patient);
        let doctor = make_doctor(&conn, None);
        let appt = completed_appointment(&conn, patient.id, doctor.id);

        for rating in [0u8, 6] {
            let err = create_review(&mut conn, patient.id, &appt, rating, None).unwrap_err();
            assert!(matches!(err, ReviewError::InvalidRating));
        }
    }
}
