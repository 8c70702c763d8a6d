//! Shared types for the API layer.

use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::Config;
use crate::db;
use crate::models::{Doctor, Role, User};

/// Shared context for all API routes and middleware.
///
/// Each request opens its own SQLite connection against the configured path;
/// there is no shared mutable in-process state beyond the store itself.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
}

impl ApiContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_database(&self.config.database_path).map_err(ApiError::from)
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }

    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role != role {
            return Err(ApiError::Forbidden(format!(
                "{} role required",
                role.as_str()
            )));
        }
        Ok(())
    }

    /// Resolve the doctor row behind a doctor-role caller.
    pub fn require_doctor(&self, conn: &Connection) -> Result<Doctor, ApiError> {
        self.require_role(Role::Doctor)?;
        db::get_doctor_by_user_id(conn, &self.user_id)?
            .ok_or_else(|| ApiError::Forbidden("No doctor profile for this account".into()))
    }
}
