use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
        (2, include_str!("../../resources/migrations/002_payments_reviews.sql")),
        (3, include_str!("../../resources/migrations/003_auxiliary.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| DatabaseError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // 10 entity tables + sessions + schema_version = 12
        let count = count_tables(&conn).unwrap();
        assert!(count >= 12, "Expected at least 12 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 3);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn active_slot_index_rejects_double_booking() {
        let conn = open_memory_database().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at)
             VALUES ('u1', 'a@b.c', 'x', 'A', 'B', 'patient', '2026-01-01T00:00:00Z');
             INSERT INTO doctors (id, first_name, last_name, specialty)
             VALUES ('d1', 'Doc', 'Tor', 'cardiology');
             INSERT INTO appointments (id, patient_id, doctor_id, date, time_slot, status, created_at)
             VALUES ('a1', 'u1', 'd1', '2026-03-01', '10:00', 'pending', '2026-01-01T00:00:00Z');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, date, time_slot, status, created_at)
             VALUES ('a2', 'u1', 'd1', '2026-03-01', '10:00', 'pending', '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(dup.is_err());

        // A cancelled row does not block the slot
        conn.execute(
            "UPDATE appointments SET status = 'cancelled' WHERE id = 'a1'",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, date, time_slot, status, created_at)
             VALUES ('a3', 'u1', 'd1', '2026-03-01', '10:00', 'pending', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn constraint_violation_maps_to_own_variant() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at)
             VALUES ('u1', 'a@b.c', 'x', 'A', 'B', 'patient', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let err: DatabaseError = conn
            .execute(
                "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at)
                 VALUES ('u2', 'a@b.c', 'x', 'A', 'B', 'patient', '2026-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err()
            .into();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }
}
