use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{column_enum, column_uuid};
use crate::db::DatabaseError;
use crate::models::User;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, role, birth_date, avatar_path, created_at";

pub(crate) fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: column_uuid(row, 0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone: row.get(5)?,
        role: column_enum(row, 6)?,
        birth_date: row.get(7)?,
        avatar_path: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, phone, role, birth_date, avatar_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user.id.to_string(),
            user.email,
            user.password_hash,
            user.first_name,
            user.last_name,
            user.phone,
            user.role.as_str(),
            user.birth_date,
            user.avatar_path,
            user.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_user) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;
    match stmt.query_row(params![email], map_user) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_user_profile(
    conn: &Connection,
    id: &Uuid,
    first_name: &str,
    last_name: &str,
    phone: Option<&str>,
    birth_date: Option<NaiveDate>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET first_name = ?2, last_name = ?3, phone = ?4, birth_date = ?5
         WHERE id = ?1",
        params![id.to_string(), first_name, last_name, phone, birth_date],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("User", id));
    }
    Ok(())
}

pub fn set_user_avatar(conn: &Connection, id: &Uuid, path: &str) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET avatar_path = ?2 WHERE id = ?1",
        params![id.to_string(), path],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("User", id));
    }
    Ok(())
}
