use rusqlite::{params, Connection};
use uuid::Uuid;

use super::doctor::map_doctor;
use crate::db::DatabaseError;
use crate::models::Doctor;

pub fn favorite_exists(
    conn: &Connection,
    user_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM favorites WHERE user_id = ?1 AND doctor_id = ?2",
        params![user_id.to_string(), doctor_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn insert_favorite(
    conn: &Connection,
    user_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO favorites (user_id, doctor_id, created_at) VALUES (?1, ?2, ?3)",
        params![
            user_id.to_string(),
            doctor_id.to_string(),
            chrono::Utc::now(),
        ],
    )?;
    Ok(())
}

pub fn delete_favorite(
    conn: &Connection,
    user_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM favorites WHERE user_id = ?1 AND doctor_id = ?2",
        params![user_id.to_string(), doctor_id.to_string()],
    )?;
    Ok(())
}

/// Doctors a user has favorited, most recently favorited first.
pub fn list_favorite_doctors(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.user_id, d.first_name, d.last_name, d.specialty, d.experience_years,
                d.bio, d.rating, d.available
         FROM favorites f
         JOIN doctors d ON d.id = f.doctor_id
         WHERE f.user_id = ?1
         ORDER BY f.created_at DESC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], map_doctor)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
