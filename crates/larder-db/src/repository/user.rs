//! SurrealDB implementation of [`UserRepository`].
//!
//! This is the sole creation path for user records: emails are
//! normalized, passwords hashed with Argon2id (via `larder-auth`), and
//! creation without an email is rejected before anything is written.

use chrono::{DateTime, Utc};
use larder_auth::password;
use larder_core::email::normalize_email;
use larder_core::error::{LarderError, LarderResult};
use larder_core::models::user::{CreateUser, UpdateUser, User};
use larder_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> LarderResult<User> {
        if input.email.trim().is_empty() {
            return Err(LarderError::Validation {
                message: "users must have an email address".into(),
            });
        }
        let email = normalize_email(&input.email);

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = password::hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, name = $name, \
                 password_hash = $password_hash, \
                 is_active = true, is_staff = false, \
                 is_superuser = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", email))
            .bind(("name", input.name))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn create_superuser(&self, input: CreateUser) -> LarderResult<User> {
        let user = self.create(input).await?;
        let id_str = user.id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 is_staff = true, is_superuser = true, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(user.id))
    }

    async fn get_by_id(&self, id: Uuid) -> LarderResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_email(&self, email: &str) -> LarderResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> LarderResult<User> {
        let id_str = id.to_string();

        let email = match input.email {
            Some(ref raw) => {
                if raw.trim().is_empty() {
                    return Err(LarderError::Validation {
                        message: "users must have an email address".into(),
                    });
                }
                Some(normalize_email(raw))
            }
            None => None,
        };
        let password_hash = match input.password {
            Some(ref raw) => Some(password::hash_password(raw, self.pepper.as_deref())?),
            None => None,
        };

        let mut sets = Vec::new();
        if email.is_some() {
            sets.push("email = $email");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.last_login.is_some() {
            sets.push("last_login = $last_login");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = email {
            builder = builder.bind(("email", email));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(password_hash) = password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(last_login) = input.last_login {
            builder = builder.bind(("last_login", last_login));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn delete(&self, id: Uuid) -> LarderResult<()> {
        // Hard delete with cascade: junction edges first, then the
        // user's rows, then the user itself. Edges are dropped for
        // both directions so that another owner's recipe referencing
        // this user's ingredient/tag is left without dangling links.
        let id_str = id.to_string();

        self.db
            .query(
                "DELETE recipe_ingredient WHERE in.owner = $owner \
                 OR out.owner = $owner; \
                 DELETE recipe_tag WHERE in.owner = $owner \
                 OR out.owner = $owner; \
                 DELETE api_token WHERE user = $owner; \
                 DELETE recipe WHERE owner = $owner; \
                 DELETE tag WHERE owner = $owner; \
                 DELETE ingredient WHERE owner = $owner; \
                 DELETE type::record('user', $id);",
            )
            .bind(("owner", id_str.clone()))
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LarderResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
