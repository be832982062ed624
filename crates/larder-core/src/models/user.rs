//! User domain model.
//!
//! Identity is the email address — there is no separate username. The
//! password is only ever held as an Argon2id hash; creation and updates
//! go through the user repository, which is the sole path that hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Display name; may be empty.
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Set when the user last authenticated successfully.
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    /// Re-normalized before storage.
    pub email: Option<String>,
    pub name: Option<String>,
    /// Raw password; re-hashed before storage.
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
}
