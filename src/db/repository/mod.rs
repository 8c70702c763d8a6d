//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&rusqlite::Connection`, split into domain sub-modules.
//! All public functions are re-exported here.

mod admin;
mod appointment;
mod doctor;
mod favorite;
mod health_profile;
mod medical_record;
mod payment;
mod payment_method;
mod review;
mod service;
mod session;
mod user;

pub use admin::*;
pub use appointment::*;
pub use doctor::*;
pub use favorite::*;
pub use health_profile::*;
pub use medical_record::*;
pub use payment::*;
pub use payment_method::*;
pub use review::*;
pub use service::*;
pub use session::*;
pub use user::*;

use rusqlite::Row;
use uuid::Uuid;

/// Read a TEXT uuid column.
pub(crate) fn column_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

/// Read a nullable TEXT uuid column.
pub(crate) fn column_uuid_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
        None => Ok(None),
    }
}

/// Read a TEXT enum column via FromStr.
pub(crate) fn column_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid enum value: {s}").into(),
        )
    })
}

/// Read a nullable TEXT enum column via FromStr.
pub(crate) fn column_enum_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: std::str::FromStr,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => s.parse().map(Some).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                format!("invalid enum value: {s}").into(),
            )
        }),
        None => Ok(None),
    }
}
