//! SurrealDB implementation of [`TagRepository`].

use chrono::{DateTime, Utc};
use larder_core::error::LarderResult;
use larder_core::models::tag::{CreateTag, Tag, UpdateTag};
use larder_core::repository::{PaginatedResult, Pagination, TagRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, assert_reference};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TagRow {
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TagRowWithId {
    record_id: String,
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TagRow {
    fn try_into_tag(self, id: Uuid) -> Result<Tag, DbError> {
        let owner = Uuid::parse_str(&self.owner)
            .map_err(|e| DbError::Query(format!("invalid owner UUID: {e}")))?;
        Ok(Tag {
            id,
            name: self.name,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TagRowWithId {
    fn try_into_tag(self) -> Result<Tag, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let owner = Uuid::parse_str(&self.owner)
            .map_err(|e| DbError::Query(format!("invalid owner UUID: {e}")))?;
        Ok(Tag {
            id,
            name: self.name,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Tag repository.
#[derive(Clone)]
pub struct SurrealTagRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTagRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TagRepository for SurrealTagRepository<C> {
    async fn create(&self, input: CreateTag) -> LarderResult<Tag> {
        let owner_str = input.owner.to_string();
        assert_reference(&self.db, "user", &owner_str).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tag', $id) SET \
                 name = $name, owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("owner", owner_str))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag(id)?)
    }

    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> LarderResult<Tag> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('tag', $id) \
                 WHERE owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag(id)?)
    }

    async fn update(&self, owner: Uuid, id: Uuid, input: UpdateTag) -> LarderResult<Tag> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tag', $id) SET {} \
             WHERE owner = $owner",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag(id)?)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> LarderResult<()> {
        // Scope check before touching edges that other owners' recipes
        // may hold onto.
        self.get_by_id(owner, id).await?;

        let id_str = id.to_string();
        self.db
            .query(
                "DELETE recipe_tag WHERE out = type::record('tag', $id); \
                 DELETE type::record('tag', $id);",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        pagination: Pagination,
    ) -> LarderResult<PaginatedResult<Tag>> {
        let owner_str = owner.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM tag \
                 WHERE owner = $owner GROUP ALL",
            )
            .bind(("owner", owner_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE owner = $owner \
                 ORDER BY name DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner", owner_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tag())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
