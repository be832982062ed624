//! Database readiness gate.
//!
//! In containerized deployments the database may come up after the
//! application. [`wait_for_db`] blocks the caller until a probe
//! succeeds, retrying connectivity failures on a fixed one-second
//! interval with no retry cap. Anything other than a connectivity
//! failure is a configuration problem and propagates immediately.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Ws;
use surrealdb::opt::auth::Root;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::connection::DbConfig;

/// Fixed interval between connection attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of a failed readiness probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The database is not accepting connections yet; worth retrying.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Credentials or namespace selection failed; retrying cannot help.
    #[error("database configuration error: {0}")]
    Fatal(String),
}

/// A single attempt to establish a usable database connection.
pub trait DatabaseProbe: Send + Sync {
    fn check(&self) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// Block until the database accepts connections.
///
/// Probes once per second until the probe succeeds, logging every
/// failed attempt. Returns `Err` only for [`ProbeError::Fatal`].
pub async fn wait_for_db<P: DatabaseProbe>(probe: &P) -> Result<(), ProbeError> {
    info!("Waiting for database...");
    let mut attempt: u64 = 1;
    loop {
        match probe.check().await {
            Ok(()) => {
                info!(attempt, "Database ready");
                return Ok(());
            }
            Err(ProbeError::Unavailable(reason)) => {
                warn!(attempt, %reason, "Database unavailable, retrying in 1 second");
                sleep(RETRY_INTERVAL).await;
                attempt += 1;
            }
            Err(fatal @ ProbeError::Fatal(_)) => return Err(fatal),
        }
    }
}

/// Production probe: attempts a full SurrealDB connect.
///
/// Transport errors while establishing the WebSocket are transient;
/// signin or namespace selection failures mean the configuration is
/// wrong and are fatal.
pub struct ConnectionProbe {
    config: DbConfig,
}

impl ConnectionProbe {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }
}

impl DatabaseProbe for ConnectionProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let db = Surreal::new::<Ws>(&self.config.url)
            .await
            .map_err(|e| ProbeError::Unavailable(e.to_string()))?;

        db.signin(Root {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        })
        .await
        .map_err(|e| ProbeError::Fatal(e.to_string()))?;

        db.use_ns(&self.config.namespace)
            .use_db(&self.config.database)
            .await
            .map_err(|e| ProbeError::Fatal(e.to_string()))?;

        Ok(())
    }
}
