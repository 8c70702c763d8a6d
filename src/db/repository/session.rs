use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::column_uuid;
use crate::db::DatabaseError;
use crate::models::Session;

pub fn insert_session(conn: &Connection, session: &Session) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            session.token_hash,
            session.user_id.to_string(),
            session.expires_at,
            session.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, token_hash: &str) -> Result<Option<Session>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT token_hash, user_id, expires_at, created_at FROM sessions WHERE token_hash = ?1",
    )?;
    let result = stmt.query_row(params![token_hash], |row| {
        Ok(Session {
            token_hash: row.get(0)?,
            user_id: column_uuid(row, 1)?,
            expires_at: row.get(2)?,
            created_at: row.get(3)?,
        })
    });
    match result {
        Ok(session) => Ok(Some(session)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
    Ok(())
}

/// Drop every expired session; returns how many were removed.
pub fn delete_expired_sessions(
    conn: &Connection,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let removed = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
    Ok(removed)
}
