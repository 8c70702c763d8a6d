use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::column_uuid;
use crate::db::DatabaseError;
use crate::models::{Review, ReviewDetail};

const REVIEW_COLUMNS: &str =
    "id, appointment_id, patient_id, doctor_id, rating, comment, created_at";

pub(crate) fn map_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: column_uuid(row, 0)?,
        appointment_id: column_uuid(row, 1)?,
        patient_id: column_uuid(row, 2)?,
        doctor_id: column_uuid(row, 3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn insert_review(conn: &Connection, review: &Review) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reviews (id, appointment_id, patient_id, doctor_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            review.id.to_string(),
            review.appointment_id.to_string(),
            review.patient_id.to_string(),
            review.doctor_id.to_string(),
            review.rating,
            review.comment,
            review.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_reviews_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Review>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE patient_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_review)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// A doctor's received reviews, newest first, with the patient's name joined.
pub fn list_reviews_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<ReviewDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.appointment_id, r.patient_id, r.doctor_id, r.rating, r.comment, r.created_at,
                u.first_name || ' ' || u.last_name
         FROM reviews r
         JOIN users u ON u.id = r.patient_id
         WHERE r.doctor_id = ?1
         ORDER BY r.created_at DESC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        Ok(ReviewDetail {
            review: map_review(row)?,
            patient_name: row.get(7)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Mean rating across all of a doctor's reviews; None when unreviewed.
pub fn mean_rating(conn: &Connection, doctor_id: &Uuid) -> Result<Option<f64>, DatabaseError> {
    let mean = conn.query_row(
        "SELECT AVG(rating) FROM reviews WHERE doctor_id = ?1",
        params![doctor_id.to_string()],
        |row| row.get::<_, Option<f64>>(0),
    )?;
    Ok(mean)
}
