//! Larder Database — SurrealDB connection management, schema
//! migrations, the startup readiness gate, and repository
//! implementations for the `larder-core` traits.

mod connection;
mod error;
pub mod readiness;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use readiness::{ConnectionProbe, DatabaseProbe, ProbeError, wait_for_db};
pub use schema::run_migrations;
