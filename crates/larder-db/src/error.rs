//! Database-specific error types and conversions.

use larder_core::error::LarderError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Referenced {entity} does not exist: {id}")]
    MissingReference { entity: String, id: String },
}

impl From<DbError> for LarderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LarderError::NotFound { entity, id },
            DbError::MissingReference { entity, id } => {
                LarderError::ReferentialIntegrity { entity, id }
            }
            other => LarderError::Database(other.to_string()),
        }
    }
}
