//! Admin explorer queries over a closed set of tables.
//!
//! Dispatch is a static match on `AdminTable` — no runtime name-based model
//! lookup, so the reachable surface is the enum and nothing else.

use rusqlite::{params, Connection};
use serde::Serialize;

use super::{column_uuid, map_appointment, map_doctor, map_health_profile, map_medical_record,
            map_payment, map_payment_method, map_review, map_service, map_user};
use crate::db::DatabaseError;
use crate::models::{AdminTable, Favorite};

/// Rows listed per table, newest first.
pub const ADMIN_ROW_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

/// Row count for every explorable table.
pub fn admin_row_counts(conn: &Connection) -> Result<Vec<TableCount>, DatabaseError> {
    AdminTable::ALL
        .iter()
        .map(|table| {
            // Table names come from the closed enum, never from the caller.
            let rows = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table.as_str()),
                [],
                |row| row.get(0),
            )?;
            Ok(TableCount {
                table: table.as_str(),
                rows,
            })
        })
        .collect()
}

fn collect_json<T, F>(
    conn: &Connection,
    sql: &str,
    map: F,
) -> Result<Vec<serde_json::Value>, DatabaseError>
where
    T: Serialize,
    F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![ADMIN_ROW_LIMIT], map)?;
    rows.map(|r| {
        let entity = r.map_err(DatabaseError::from)?;
        serde_json::to_value(&entity).map_err(DatabaseError::from)
    })
    .collect()
}

/// Up to [`ADMIN_ROW_LIMIT`] most-recently-created rows of one table, reshaped
/// as JSON objects. `User` serialization already omits the password hash.
pub fn admin_list_rows(
    conn: &Connection,
    table: AdminTable,
) -> Result<Vec<serde_json::Value>, DatabaseError> {
    match table {
        AdminTable::Users => collect_json(
            conn,
            "SELECT id, email, password_hash, first_name, last_name, phone, role, birth_date, avatar_path, created_at
             FROM users ORDER BY created_at DESC LIMIT ?1",
            map_user,
        ),
        AdminTable::Doctors => collect_json(
            conn,
            "SELECT id, user_id, first_name, last_name, specialty, experience_years, bio, rating, available
             FROM doctors ORDER BY rowid DESC LIMIT ?1",
            map_doctor,
        ),
        AdminTable::Services => collect_json(
            conn,
            "SELECT id, doctor_id, name, price, duration_minutes
             FROM services ORDER BY rowid DESC LIMIT ?1",
            map_service,
        ),
        AdminTable::Appointments => collect_json(
            conn,
            "SELECT id, patient_id, doctor_id, service_id, date, time_slot, status, created_at
             FROM appointments ORDER BY created_at DESC LIMIT ?1",
            map_appointment,
        ),
        AdminTable::Payments => collect_json(
            conn,
            "SELECT id, patient_id, appointment_id, amount, status, method_type, transaction_id, created_at
             FROM payments ORDER BY created_at DESC LIMIT ?1",
            map_payment,
        ),
        AdminTable::PaymentMethods => collect_json(
            conn,
            "SELECT id, user_id, method_type, display_name, masked_number, is_default, created_at
             FROM payment_methods ORDER BY created_at DESC LIMIT ?1",
            map_payment_method,
        ),
        AdminTable::Reviews => collect_json(
            conn,
            "SELECT id, appointment_id, patient_id, doctor_id, rating, comment, created_at
             FROM reviews ORDER BY created_at DESC LIMIT ?1",
            map_review,
        ),
        AdminTable::Favorites => collect_json(
            conn,
            "SELECT user_id, doctor_id, created_at
             FROM favorites ORDER BY created_at DESC LIMIT ?1",
            |row| {
                Ok(Favorite {
                    user_id: column_uuid(row, 0)?,
                    doctor_id: column_uuid(row, 1)?,
                    created_at: row.get(2)?,
                })
            },
        ),
        AdminTable::HealthProfiles => collect_json(
            conn,
            "SELECT user_id, blood_type, height_cm, weight_kg, allergies, chronic_conditions, updated_at
             FROM health_profiles ORDER BY updated_at DESC LIMIT ?1",
            map_health_profile,
        ),
        AdminTable::MedicalRecords => collect_json(
            conn,
            "SELECT id, patient_id, author_id, title, record_type, description, record_date, created_at
             FROM medical_records ORDER BY created_at DESC LIMIT ?1",
            map_medical_record,
        ),
    }
}

/// Delete one row by primary key. Favorites use `user_id:doctor_id` as the
/// composite id; health profiles are keyed by user id. Returns whether a row
/// was removed. Declared foreign keys still apply — a delete with dependents
/// fails as a constraint violation rather than orphaning children.
pub fn admin_delete_row(
    conn: &Connection,
    table: AdminTable,
    id: &str,
) -> Result<bool, DatabaseError> {
    let changed = match table {
        AdminTable::Users => conn.execute("DELETE FROM users WHERE id = ?1", params![id])?,
        AdminTable::Doctors => conn.execute("DELETE FROM doctors WHERE id = ?1", params![id])?,
        AdminTable::Services => conn.execute("DELETE FROM services WHERE id = ?1", params![id])?,
        AdminTable::Appointments => {
            conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?
        }
        AdminTable::Payments => conn.execute("DELETE FROM payments WHERE id = ?1", params![id])?,
        AdminTable::PaymentMethods => {
            conn.execute("DELETE FROM payment_methods WHERE id = ?1", params![id])?
        }
        AdminTable::Reviews => conn.execute("DELETE FROM reviews WHERE id = ?1", params![id])?,
        AdminTable::Favorites => {
            let (user_id, doctor_id) = id.split_once(':').ok_or_else(|| {
                DatabaseError::ConstraintViolation(
                    "favorites id must be user_id:doctor_id".to_string(),
                )
            })?;
            conn.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND doctor_id = ?2",
                params![user_id, doctor_id],
            )?
        }
        AdminTable::HealthProfiles => {
            conn.execute("DELETE FROM health_profiles WHERE user_id = ?1", params![id])?
        }
        AdminTable::MedicalRecords => {
            conn.execute("DELETE FROM medical_records WHERE id = ?1", params![id])?
        }
    };
    Ok(changed > 0)
}
