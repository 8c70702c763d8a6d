use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::column_uuid;
use crate::db::DatabaseError;
use crate::models::HealthProfile;

fn decode_list(idx: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

pub(crate) fn map_health_profile(row: &Row<'_>) -> rusqlite::Result<HealthProfile> {
    let allergies: String = row.get(4)?;
    let conditions: String = row.get(5)?;
    Ok(HealthProfile {
        user_id: column_uuid(row, 0)?,
        blood_type: row.get(1)?,
        height_cm: row.get(2)?,
        weight_kg: row.get(3)?,
        allergies: decode_list(4, &allergies)?,
        chronic_conditions: decode_list(5, &conditions)?,
        updated_at: row.get(6)?,
    })
}

/// One row per user; a second upsert overwrites the first.
pub fn upsert_health_profile(
    conn: &Connection,
    profile: &HealthProfile,
) -> Result<(), DatabaseError> {
    let allergies = serde_json::to_string(&profile.allergies)?;
    let conditions = serde_json::to_string(&profile.chronic_conditions)?;
    conn.execute(
        "INSERT INTO health_profiles (user_id, blood_type, height_cm, weight_kg, allergies, chronic_conditions, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(user_id) DO UPDATE SET
             blood_type = excluded.blood_type,
             height_cm = excluded.height_cm,
             weight_kg = excluded.weight_kg,
             allergies = excluded.allergies,
             chronic_conditions = excluded.chronic_conditions,
             updated_at = excluded.updated_at",
        params![
            profile.user_id.to_string(),
            profile.blood_type,
            profile.height_cm,
            profile.weight_kg,
            allergies,
            conditions,
            profile.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_health_profile(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<HealthProfile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT user_id, blood_type, height_cm, weight_kg, allergies, chronic_conditions, updated_at
         FROM health_profiles WHERE user_id = ?1",
    )?;
    match stmt.query_row(params![user_id.to_string()], map_health_profile) {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
