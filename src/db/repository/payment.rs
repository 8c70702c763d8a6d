use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_enum, column_enum_opt, column_uuid, column_uuid_opt};
use crate::db::DatabaseError;
use crate::models::{MethodType, Payment, PaymentStatus};

const PAYMENT_COLUMNS: &str =
    "id, patient_id, appointment_id, amount, status, method_type, transaction_id, created_at";

pub(crate) fn map_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: column_uuid(row, 0)?,
        patient_id: column_uuid(row, 1)?,
        appointment_id: column_uuid_opt(row, 2)?,
        amount: row.get(3)?,
        status: column_enum(row, 4)?,
        method_type: column_enum_opt(row, 5)?,
        transaction_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, patient_id, appointment_id, amount, status, method_type, transaction_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            payment.id.to_string(),
            payment.patient_id.to_string(),
            payment.appointment_id.map(|id| id.to_string()),
            payment.amount,
            payment.status.as_str(),
            payment.method_type.map(|m| m.as_str()),
            payment.transaction_id,
            payment.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_payment(conn: &Connection, id: &Uuid) -> Result<Option<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], map_payment) {
        Ok(payment) => Ok(Some(payment)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_payment_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE appointment_id = ?1"
    ))?;
    match stmt.query_row(params![appointment_id.to_string()], map_payment) {
        Ok(payment) => Ok(Some(payment)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_payments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE patient_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_payment)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Record settlement. The payments::settle_payment transaction is the only
/// caller.
pub fn mark_payment_completed(
    conn: &Connection,
    id: &Uuid,
    method_type: MethodType,
    transaction_id: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE payments SET status = ?2, method_type = ?3, transaction_id = ?4 WHERE id = ?1",
        params![
            id.to_string(),
            PaymentStatus::Completed.as_str(),
            method_type.as_str(),
            transaction_id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Payment", id));
    }
    Ok(())
}
