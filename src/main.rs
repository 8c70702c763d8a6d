use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medibook::{api, config, db, seed};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Arc::new(config::Config::from_env());

    // Opening runs pending migrations.
    let conn = match db::open_database(&config.database_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to open {}: {e}", config.database_path.display());
            return ExitCode::FAILURE;
        }
    };

    if std::env::args().any(|arg| arg == "--seed") {
        if let Err(e) = seed::seed_demo_data(&conn) {
            tracing::error!("Seeding failed: {e}");
            return ExitCode::FAILURE;
        }
    }
    drop(conn);

    if let Err(e) = api::serve(config).await {
        tracing::error!("Server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
