pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        // Surface UNIQUE/CHECK/FK failures as their own variant so callers can
        // map them to user-visible conflicts (e.g. an already-taken slot).
        if let rusqlite::Error::SqliteFailure(e, ref msg) = err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return DatabaseError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| e.to_string()),
                );
            }
        }
        DatabaseError::Sqlite(err)
    }
}

impl DatabaseError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        DatabaseError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
