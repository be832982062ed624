//! SurrealDB implementation of [`IngredientRepository`].

use chrono::{DateTime, Utc};
use larder_core::error::LarderResult;
use larder_core::models::ingredient::{CreateIngredient, Ingredient, UpdateIngredient};
use larder_core::repository::{IngredientRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, assert_reference};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct IngredientRow {
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct IngredientRowWithId {
    record_id: String,
    name: String,
    owner: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IngredientRow {
    fn try_into_ingredient(self, id: Uuid) -> Result<Ingredient, DbError> {
        let owner = Uuid::parse_str(&self.owner)
            .map_err(|e| DbError::Query(format!("invalid owner UUID: {e}")))?;
        Ok(Ingredient {
            id,
            name: self.name,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl IngredientRowWithId {
    fn try_into_ingredient(self) -> Result<Ingredient, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let owner = Uuid::parse_str(&self.owner)
            .map_err(|e| DbError::Query(format!("invalid owner UUID: {e}")))?;
        Ok(Ingredient {
            id,
            name: self.name,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Ingredient repository.
#[derive(Clone)]
pub struct SurrealIngredientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIngredientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> IngredientRepository for SurrealIngredientRepository<C> {
    async fn create(&self, input: CreateIngredient) -> LarderResult<Ingredient> {
        let owner_str = input.owner.to_string();
        assert_reference(&self.db, "user", &owner_str).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('ingredient', $id) SET \
                 name = $name, owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("owner", owner_str))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<IngredientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ingredient".into(),
            id: id_str,
        })?;

        Ok(row.try_into_ingredient(id)?)
    }

    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> LarderResult<Ingredient> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('ingredient', $id) \
                 WHERE owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IngredientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ingredient".into(),
            id: id_str,
        })?;

        Ok(row.try_into_ingredient(id)?)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateIngredient,
    ) -> LarderResult<Ingredient> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ingredient', $id) SET {} \
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

        let rows: Vec<IngredientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ingredient".into(),
            id: id_str,
        })?;

        Ok(row.try_into_ingredient(id)?)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> LarderResult<()> {
        self.get_by_id(owner, id).await?;

        let id_str = id.to_string();
        self.db
            .query(
                "DELETE recipe_ingredient WHERE \
                 out = type::record('ingredient', $id); \
                 DELETE type::record('ingredient', $id);",
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
    ) -> LarderResult<PaginatedResult<Ingredient>> {
        let owner_str = owner.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM ingredient \
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
                "SELECT meta::id(id) AS record_id, * FROM ingredient \
                 WHERE owner = $owner \
                 ORDER BY name DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner", owner_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IngredientRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_ingredient())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
