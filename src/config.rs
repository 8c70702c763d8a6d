use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Medibook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    "medibook=info,tower_http=info".to_string()
}

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub token_ttl: Duration,
}

impl Config {
    /// Read configuration from `MEDIBOOK_*` env vars, falling back to
    /// defaults under the user's data directory.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("MEDIBOOK_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let database_path = std::env::var("MEDIBOOK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("medibook.db"));

        let upload_dir = std::env::var("MEDIBOOK_UPLOADS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("uploads"));

        let token_ttl_hours = std::env::var("MEDIBOOK_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);

        Self {
            bind_addr,
            database_path,
            upload_dir,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }
}

/// Get the application data directory
/// ~/Medibook/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medibook")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Medibook"));
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::from_env();
        assert!(config.token_ttl >= Duration::hours(1));
        assert!(config.database_path.ends_with("medibook.db") || config.database_path.exists());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
