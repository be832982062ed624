//! SurrealDB implementation of [`TokenRepository`].

use chrono::{DateTime, Utc};
use larder_core::error::LarderResult;
use larder_core::models::token::{ApiToken, CreateApiToken};
use larder_core::repository::TokenRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TokenRow {
    user: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TokenRowWithId {
    record_id: String,
    user: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRow {
    fn try_into_token(self, id: Uuid) -> Result<ApiToken, DbError> {
        let user = Uuid::parse_str(&self.user)
            .map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))?;
        Ok(ApiToken {
            id,
            user,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

impl TokenRowWithId {
    fn try_into_token(self) -> Result<ApiToken, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let user = Uuid::parse_str(&self.user)
            .map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))?;
        Ok(ApiToken {
            id,
            user,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the bearer token repository.
#[derive(Clone)]
pub struct SurrealTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TokenRepository for SurrealTokenRepository<C> {
    async fn create(&self, input: CreateApiToken) -> LarderResult<ApiToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('api_token', $id) SET \
                 user = $user, token_hash = $token_hash, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user", input.user.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TokenRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_token".into(),
            id: id_str,
        })?;

        Ok(row.try_into_token(id)?)
    }

    async fn get_by_hash(&self, token_hash: &str) -> LarderResult<ApiToken> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM api_token \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TokenRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_token".into(),
            id: "token_hash".into(),
        })?;

        Ok(row.try_into_token()?)
    }

    async fn revoke(&self, id: Uuid) -> LarderResult<()> {
        self.db
            .query("DELETE type::record('api_token', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn revoke_user_tokens(&self, user: Uuid) -> LarderResult<()> {
        self.db
            .query("DELETE api_token WHERE user = $user")
            .bind(("user", user.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> LarderResult<u64> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM api_token \
                 WHERE expires_at <= time::now() GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE api_token WHERE expires_at <= time::now()")
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(total)
    }
}
