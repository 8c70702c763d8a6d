use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_uuid, column_uuid_opt};
use crate::db::DatabaseError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str =
    "id, user_id, first_name, last_name, specialty, experience_years, bio, rating, available";

pub(crate) fn map_doctor(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: column_uuid(row, 0)?,
        user_id: column_uuid_opt(row, 1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        specialty: row.get(4)?,
        experience_years: row.get(5)?,
        bio: row.get(6)?,
        rating: row.get(7)?,
        available: row.get(8)?,
    })
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, first_name, last_name, specialty, experience_years, bio, rating, available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            doctor.id.to_string(),
            doctor.user_id.map(|id| id.to_string()),
            doctor.first_name,
            doctor.last_name,
            doctor.specialty,
            doctor.experience_years,
            doctor.bio,
            doctor.rating,
            doctor.available,
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_doctor) {
        Ok(doctor) => Ok(Some(doctor)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the doctor row behind a signed-in doctor account.
pub fn get_doctor_by_user_id(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE user_id = ?1"))?;
    match stmt.query_row(params![user_id.to_string()], map_doctor) {
        Ok(doctor) => Ok(Some(doctor)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY last_name, first_name"
    ))?;
    let rows = stmt.query_map([], map_doctor)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_doctors(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count)
}

/// Persist a recomputed aggregate rating. Only reviews::recompute_doctor_rating
/// should call this.
pub fn update_doctor_rating(
    conn: &Connection,
    id: &Uuid,
    rating: f64,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET rating = ?2 WHERE id = ?1",
        params![id.to_string(), rating],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Doctor", id));
    }
    Ok(())
}
