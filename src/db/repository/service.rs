use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::column_uuid;
use crate::db::DatabaseError;
use crate::models::Service;

pub(crate) fn map_service(row: &Row<'_>) -> rusqlite::Result<Service> {
    Ok(Service {
        id: column_uuid(row, 0)?,
        doctor_id: column_uuid(row, 1)?,
        name: row.get(2)?,
        price: row.get(3)?,
        duration_minutes: row.get(4)?,
    })
}

pub fn insert_service(conn: &Connection, service: &Service) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO services (id, doctor_id, name, price, duration_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            service.id.to_string(),
            service.doctor_id.to_string(),
            service.name,
            service.price,
            service.duration_minutes,
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &Uuid) -> Result<Option<Service>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, name, price, duration_minutes FROM services WHERE id = ?1",
    )?;
    match stmt.query_row(params![id.to_string()], map_service) {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Service>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, name, price, duration_minutes FROM services
         WHERE doctor_id = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_service)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_service(
    conn: &Connection,
    id: &Uuid,
    name: &str,
    price: i64,
    duration_minutes: u32,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE services SET name = ?2, price = ?3, duration_minutes = ?4 WHERE id = ?1",
        params![id.to_string(), name, price, duration_minutes],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Service", id));
    }
    Ok(())
}

pub fn delete_service(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM services WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Service", id));
    }
    Ok(())
}
