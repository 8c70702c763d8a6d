//! Identity and sessions — password hashing, opaque bearer tokens, and the
//! session table behind them.
//!
//! Tokens are 32 random bytes, URL-safe base64 on the wire; only their SHA-256
//! hash is persisted. Passwords use PBKDF2 via the password-hash string format.

use base64::Engine;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use pbkdf2::password_hash::rand_core::OsRng as SaltOsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::RngCore;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Role, Session, User};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Registration payload after endpoint-level field validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut SaltOsRng);
    let hash = Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Create a `patient` account. Duplicate email surfaces as `EmailTaken`.
pub fn register_patient(conn: &Connection, reg: &Registration) -> Result<User, AuthError> {
    register_user(conn, reg, Role::Patient)
}

pub fn register_user(
    conn: &Connection,
    reg: &Registration,
    role: Role,
) -> Result<User, AuthError> {
    let user = User {
        id: Uuid::new_v4(),
        email: reg.email.trim().to_lowercase(),
        password_hash: hash_password(&reg.password)?,
        first_name: reg.first_name.clone(),
        last_name: reg.last_name.clone(),
        phone: reg.phone.clone(),
        role,
        birth_date: reg.birth_date,
        avatar_path: None,
        created_at: Utc::now(),
    };
    match db::insert_user(conn, &user) {
        Ok(()) => Ok(user),
        Err(DatabaseError::ConstraintViolation(_)) => Err(AuthError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Verify credentials and issue a session. Returns the user, the raw token
/// (shown to the caller exactly once) and its expiry.
pub fn login(
    conn: &Connection,
    email: &str,
    password: &str,
    token_ttl: Duration,
) -> Result<(User, String, DateTime<Utc>), AuthError> {
    let user = db::get_user_by_email(conn, &email.trim().to_lowercase())?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = generate_token();
    let now = Utc::now();
    // Login doubles as the sweep point for stale sessions.
    let swept = db::delete_expired_sessions(conn, now)?;
    if swept > 0 {
        tracing::debug!(swept, "expired sessions removed");
    }
    let session = Session {
        token_hash: hash_token(&token),
        user_id: user.id,
        expires_at: now + token_ttl,
        created_at: now,
    };
    db::insert_session(conn, &session)?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "session issued");
    Ok((user, token, session.expires_at))
}

/// Outcome of a bearer-token lookup.
pub enum TokenCheck {
    Valid(User),
    Expired,
    Unknown,
}

/// Resolve a raw bearer token to its user. Expired sessions are deleted on
/// sight rather than by a background sweeper.
pub fn resolve_token(conn: &Connection, token: &str) -> Result<TokenCheck, AuthError> {
    let token_hash = hash_token(token);
    let Some(session) = db::get_session(conn, &token_hash)? else {
        return Ok(TokenCheck::Unknown);
    };
    if session.expires_at <= Utc::now() {
        db::delete_session(conn, &token_hash)?;
        return Ok(TokenCheck::Expired);
    }
    match db::get_user(conn, &session.user_id)? {
        Some(user) => Ok(TokenCheck::Valid(user)),
        None => Ok(TokenCheck::Unknown),
    }
}

pub fn logout(conn: &Connection, token: &str) -> Result<(), AuthError> {
    db::delete_session(conn, &hash_token(token))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_db;

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            first_name: "Alex".to_string(),
            last_name: "Moreau".to_string(),
            phone: None,
            birth_date: None,
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn tokens_are_unique_and_hash_deterministically() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }

    #[test]
    fn register_then_login_round_trips_role() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();

        let (user, token, expires) = login(
            &conn,
            "pat@example.org",
            "correct horse battery",
            Duration::hours(12),
        )
        .unwrap();
        assert_eq!(user.role, Role::Patient);
        assert!(expires > Utc::now());

        match resolve_token(&conn, &token).unwrap() {
            TokenCheck::Valid(resolved) => assert_eq!(resolved.role, Role::Patient),
            _ => panic!("expected valid token"),
        }
    }

    #[test]
    fn login_normalizes_email_case() {
        let conn = test_db();
        register_patient(&conn, &registration("Pat@Example.org")).unwrap();
        let result = login(
            &conn,
            "pat@EXAMPLE.org",
            "correct horse battery",
            Duration::hours(1),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();
        let err = register_patient(&conn, &registration("pat@example.org")).unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();
        let err = login(&conn, "pat@example.org", "nope", Duration::hours(1)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn expired_session_is_reported_and_removed() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();
        let (_, token, _) = login(
            &conn,
            "pat@example.org",
            "correct horse battery",
            Duration::seconds(-1),
        )
        .unwrap();

        assert!(matches!(
            resolve_token(&conn, &token).unwrap(),
            TokenCheck::Expired
        ));
        // Second lookup: the row is gone
        assert!(matches!(
            resolve_token(&conn, &token).unwrap(),
            TokenCheck::Unknown
        ));
    }

    #[test]
    fn logout_invalidates_token() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();
        let (_, token, _) = login(
            &conn,
            "pat@example.org",
            "correct horse battery",
            Duration::hours(1),
        )
        .unwrap();
        logout(&conn, &token).unwrap();
        assert!(matches!(
            resolve_token(&conn, &token).unwrap(),
            TokenCheck::Unknown
        ));
    }

    #[test]
    fn login_sweeps_expired_sessions() {
        let conn = test_db();
        register_patient(&conn, &registration("pat@example.org")).unwrap();

        // A session that is already past its expiry
        login(
            &conn,
            "pat@example.org",
            "correct horse battery",
            Duration::hours(-1),
        )
        .unwrap();

        login(
            &conn,
            "pat@example.org",
            "correct horse battery",
            Duration::hours(1),
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
