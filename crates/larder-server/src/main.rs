//! Larder Server — application entry point.
//!
//! Blocks on the database readiness gate before applying migrations,
//! so that a slow-starting database container never races the schema
//! setup. Request serving is layered on top of the repositories by the
//! web tier.

use larder_db::{ConnectionProbe, DbConfig, DbManager, wait_for_db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("larder=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting larder server...");

    let config = DbConfig::from_env();

    let probe = ConnectionProbe::new(config.clone());
    if let Err(e) = wait_for_db(&probe).await {
        tracing::error!(error = %e, "Database readiness check failed");
        std::process::exit(1);
    }

    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = larder_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Migrations failed");
        std::process::exit(1);
    }

    tracing::info!("Database ready, schema up to date.");
}
