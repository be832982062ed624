//! Bearer token domain model.
//!
//! Only the SHA-256 digest of an issued token is ever persisted; the
//! raw value is returned to the client once and cannot be recovered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: Uuid,
    /// The user this token authenticates.
    pub user: Uuid,
    /// SHA-256 hex digest of the raw token.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiToken {
    pub user: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
