use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_enum, column_uuid};
use crate::db::DatabaseError;
use crate::models::PaymentMethod;

const METHOD_COLUMNS: &str =
    "id, user_id, method_type, display_name, masked_number, is_default, created_at";

pub(crate) fn map_payment_method(row: &Row<'_>) -> rusqlite::Result<PaymentMethod> {
    Ok(PaymentMethod {
        id: column_uuid(row, 0)?,
        user_id: column_uuid(row, 1)?,
        method_type: column_enum(row, 2)?,
        display_name: row.get(3)?,
        masked_number: row.get(4)?,
        is_default: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn insert_payment_method(
    conn: &Connection,
    method: &PaymentMethod,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payment_methods (id, user_id, method_type, display_name, masked_number, is_default, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            method.id.to_string(),
            method.user_id.to_string(),
            method.method_type.as_str(),
            method.display_name,
            method.masked_number,
            method.is_default,
            method.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_payment_method(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<PaymentMethod>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], map_payment_method) {
        Ok(method) => Ok(Some(method)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_payment_methods(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<PaymentMethod>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE user_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], map_payment_method)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Clear is_default on every method a user owns. Runs inside the same
/// transaction as the subsequent set, so "exactly one default" holds.
pub fn clear_default_methods(conn: &Connection, user_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE payment_methods SET is_default = 0 WHERE user_id = ?1",
        params![user_id.to_string()],
    )?;
    Ok(())
}

pub fn set_default_method(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE payment_methods SET is_default = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("PaymentMethod", id));
    }
    Ok(())
}

pub fn update_payment_method(
    conn: &Connection,
    id: &Uuid,
    display_name: &str,
    masked_number: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE payment_methods SET display_name = ?2, masked_number = ?3 WHERE id = ?1",
        params![id.to_string(), display_name, masked_number],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("PaymentMethod", id));
    }
    Ok(())
}

pub fn delete_payment_method(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM payment_methods WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("PaymentMethod", id));
    }
    Ok(())
}

/// The most recently created method a user still owns, if any.
pub fn newest_payment_method(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<PaymentMethod>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE user_id = ?1
         ORDER BY created_at DESC LIMIT 1"
    ))?;
    match stmt.query_row(params![user_id.to_string()], map_payment_method) {
        Ok(method) => Ok(Some(method)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count_default_methods(conn: &Connection, user_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM payment_methods WHERE user_id = ?1 AND is_default = 1",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
