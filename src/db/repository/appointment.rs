use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_enum, column_uuid, column_uuid_opt};
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentDetail, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str =
    "id, patient_id, doctor_id, service_id, date, time_slot, status, created_at";

pub(crate) fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: column_uuid(row, 0)?,
        patient_id: column_uuid(row, 1)?,
        doctor_id: column_uuid(row, 2)?,
        service_id: column_uuid_opt(row, 3)?,
        date: row.get(4)?,
        time_slot: row.get(5)?,
        status: column_enum(row, 6)?,
        created_at: row.get(7)?,
    })
}

fn map_detail(row: &Row<'_>) -> rusqlite::Result<AppointmentDetail> {
    Ok(AppointmentDetail {
        appointment: map_appointment(row)?,
        doctor_name: row.get(8)?,
        doctor_specialty: row.get(9)?,
        patient_name: row.get(10)?,
        service_name: row.get(11)?,
        service_price: row.get(12)?,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, service_id, date, time_slot, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.service_id.map(|id| id.to_string()),
            appt.date,
            appt.time_slot,
            appt.status.as_str(),
            appt.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], map_appointment) {
        Ok(appt) => Ok(Some(appt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A patient's appointments, newest date first, with display fields joined.
pub fn list_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.doctor_id, a.service_id, a.date, a.time_slot, a.status, a.created_at,
                d.first_name || ' ' || d.last_name, d.specialty,
                NULL,
                s.name, s.price
         FROM appointments a
         JOIN doctors d ON d.id = a.doctor_id
         LEFT JOIN services s ON s.id = a.service_id
         WHERE a.patient_id = ?1
         ORDER BY a.date DESC, a.time_slot DESC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_detail)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// A doctor's queue, oldest first, with the patient's name joined.
pub fn list_appointments_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, a.doctor_id, a.service_id, a.date, a.time_slot, a.status, a.created_at,
                d.first_name || ' ' || d.last_name, d.specialty,
                u.first_name || ' ' || u.last_name,
                s.name, s.price
         FROM appointments a
         JOIN doctors d ON d.id = a.doctor_id
         JOIN users u ON u.id = a.patient_id
         LEFT JOIN services s ON s.id = a.service_id
         WHERE a.doctor_id = ?1
         ORDER BY a.date ASC, a.time_slot ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_detail)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Slot labels already taken for a doctor on one day, cancelled excluded.
pub fn taken_slots(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT time_slot FROM appointments
         WHERE doctor_id = ?1 AND date = ?2 AND status != 'cancelled'
         ORDER BY time_slot",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string(), date], |row| row.get(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Appointment", id));
    }
    Ok(())
}
