//! Error types for the larder system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LarderError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Referenced {entity} does not exist: {id}")]
    ReferentialIntegrity { entity: String, id: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

pub type LarderResult<T> = Result<T, LarderError>;
