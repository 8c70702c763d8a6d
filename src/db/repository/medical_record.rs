use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_enum, column_uuid, column_uuid_opt};
use crate::db::DatabaseError;
use crate::models::MedicalRecord;

const RECORD_COLUMNS: &str =
    "id, patient_id, author_id, title, record_type, description, record_date, created_at";

pub(crate) fn map_medical_record(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: column_uuid(row, 0)?,
        patient_id: column_uuid(row, 1)?,
        author_id: column_uuid_opt(row, 2)?,
        title: row.get(3)?,
        record_type: column_enum(row, 4)?,
        description: row.get(5)?,
        record_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn insert_medical_record(
    conn: &Connection,
    record: &MedicalRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medical_records (id, patient_id, author_id, title, record_type, description, record_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id.to_string(),
            record.patient_id.to_string(),
            record.author_id.map(|id| id.to_string()),
            record.title,
            record.record_type.as_str(),
            record.description,
            record.record_date,
            record.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_medical_record(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], map_medical_record) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_medical_records(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records WHERE patient_id = ?1
         ORDER BY record_date DESC, created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_medical_record)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn delete_medical_record(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM medical_records WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("MedicalRecord", id));
    }
    Ok(())
}
