//! SurrealDB implementation of [`RecipeRepository`].
//!
//! Ingredient and tag references are junction edges
//! (`recipe_ingredient`, `recipe_tag`). Referenced rows must exist at
//! write time but may belong to any user — the catalog is shared.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use larder_core::error::LarderResult;
use larder_core::media::recipe_image_path;
use larder_core::models::recipe::{CreateRecipe, Recipe, UpdateRecipe};
use larder_core::repository::{PaginatedResult, Pagination, RecipeRepository};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, assert_reference};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct RecipeRow {
    owner: String,
    title: String,
    time_minutes: u32,
    price: Decimal,
    link: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RecipeRowWithId {
    record_id: String,
    owner: String,
    title: String,
    time_minutes: u32,
    price: Decimal,
    link: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Junction row: recipe id and referenced id, both via `meta::id`.
#[derive(Debug, SurrealValue)]
struct EdgeRow {
    rid: String,
    oid: String,
}

impl RecipeRow {
    fn try_into_recipe(
        self,
        id: Uuid,
        ingredients: Vec<Uuid>,
        tags: Vec<Uuid>,
    ) -> Result<Recipe, DbError> {
        let owner = Uuid::parse_str(&self.owner)
            .map_err(|e| DbError::Query(format!("invalid owner UUID: {e}")))?;
        Ok(Recipe {
            id,
            owner,
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            ingredients,
            tags,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Query(format!("invalid UUID: {e}")))
}

/// SurrealDB implementation of the Recipe repository.
#[derive(Clone)]
pub struct SurrealRecipeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRecipeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Replace the full edge set of `edge_table` for one recipe.
    ///
    /// Every referenced id must exist in `target_table` first.
    async fn replace_references(
        &self,
        edge_table: &str,
        target_table: &str,
        recipe_id: &str,
        refs: &[Uuid],
    ) -> Result<(), DbError> {
        for reference in refs {
            assert_reference(&self.db, target_table, &reference.to_string()).await?;
        }

        self.db
            .query(format!(
                "DELETE {edge_table} WHERE in = type::record('recipe', $id);"
            ))
            .bind(("id", recipe_id.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        for reference in refs {
            self.db
                .query(format!(
                    "RELATE recipe:`{recipe_id}` -> {edge_table} \
                     -> {target_table}:`{reference}`;"
                ))
                .await?
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;
        }

        Ok(())
    }

    /// Referenced ids for one recipe from a junction table, sorted for
    /// deterministic output.
    async fn fetch_references(
        &self,
        edge_table: &str,
        recipe_id: &str,
    ) -> Result<Vec<Uuid>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "SELECT VALUE meta::id(out) FROM {edge_table} \
                 WHERE in = type::record('recipe', $id)"
            ))
            .bind(("id", recipe_id.to_string()))
            .await?;

        let raw: Vec<String> = result.take(0)?;
        let mut ids = raw
            .iter()
            .map(|s| parse_uuid(s))
            .collect::<Result<Vec<_>, DbError>>()?;
        ids.sort();
        Ok(ids)
    }

    /// Referenced ids for every recipe of one owner, keyed by recipe id.
    async fn fetch_owner_references(
        &self,
        edge_table: &str,
        owner: &str,
    ) -> Result<HashMap<String, Vec<Uuid>>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(in) AS rid, meta::id(out) AS oid \
                 FROM {edge_table} WHERE in.owner = $owner"
            ))
            .bind(("owner", owner.to_string()))
            .await?;

        let rows: Vec<EdgeRow> = result.take(0)?;
        let mut map: HashMap<String, Vec<Uuid>> = HashMap::new();
        for row in rows {
            map.entry(row.rid).or_default().push(parse_uuid(&row.oid)?);
        }
        for ids in map.values_mut() {
            ids.sort();
        }
        Ok(map)
    }
}

impl<C: Connection> RecipeRepository for SurrealRecipeRepository<C> {
    async fn create(&self, input: CreateRecipe) -> LarderResult<Recipe> {
        let owner_str = input.owner.to_string();
        assert_reference(&self.db, "user", &owner_str).await?;
        for ingredient in &input.ingredients {
            assert_reference(&self.db, "ingredient", &ingredient.to_string()).await?;
        }
        for tag in &input.tags {
            assert_reference(&self.db, "tag", &tag.to_string()).await?;
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('recipe', $id) SET \
                 owner = $owner, title = $title, \
                 time_minutes = $time_minutes, price = $price, \
                 link = $link",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner", owner_str))
            .bind(("title", input.title))
            .bind(("time_minutes", input.time_minutes))
            .bind(("price", input.price))
            .bind(("link", input.link))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RecipeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "recipe".into(),
            id: id_str.clone(),
        })?;

        for ingredient in &input.ingredients {
            self.db
                .query(format!(
                    "RELATE recipe:`{id_str}` -> recipe_ingredient \
                     -> ingredient:`{ingredient}`;"
                ))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;
        }
        for tag in &input.tags {
            self.db
                .query(format!(
                    "RELATE recipe:`{id_str}` -> recipe_tag -> tag:`{tag}`;"
                ))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;
        }

        let mut ingredients = input.ingredients;
        ingredients.sort();
        let mut tags = input.tags;
        tags.sort();

        Ok(row.try_into_recipe(id, ingredients, tags)?)
    }

    async fn get_by_id(&self, owner: Uuid, id: Uuid) -> LarderResult<Recipe> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('recipe', $id) \
                 WHERE owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RecipeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "recipe".into(),
            id: id_str.clone(),
        })?;

        let ingredients = self.fetch_references("recipe_ingredient", &id_str).await?;
        let tags = self.fetch_references("recipe_tag", &id_str).await?;

        Ok(row.try_into_recipe(id, ingredients, tags)?)
    }

    async fn update(&self, owner: Uuid, id: Uuid, input: UpdateRecipe) -> LarderResult<Recipe> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.time_minutes.is_some() {
            sets.push("time_minutes = $time_minutes");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.link.is_some() {
            sets.push("link = $link");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('recipe', $id) SET {} \
             WHERE owner = $owner",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(time_minutes) = input.time_minutes {
            builder = builder.bind(("time_minutes", time_minutes));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(link) = input.link {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("link", link));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RecipeRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "recipe".into(),
                id: id_str,
            }
            .into());
        }

        if let Some(ingredients) = input.ingredients {
            self.replace_references("recipe_ingredient", "ingredient", &id_str, &ingredients)
                .await?;
        }
        if let Some(tags) = input.tags {
            self.replace_references("recipe_tag", "tag", &id_str, &tags)
                .await?;
        }

        self.get_by_id(owner, id).await
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> LarderResult<()> {
        self.get_by_id(owner, id).await?;

        let id_str = id.to_string();
        self.db
            .query(
                "DELETE recipe_ingredient WHERE \
                 in = type::record('recipe', $id); \
                 DELETE recipe_tag WHERE in = type::record('recipe', $id); \
                 DELETE type::record('recipe', $id);",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn set_image(
        &self,
        owner: Uuid,
        id: Uuid,
        original_filename: &str,
    ) -> LarderResult<Recipe> {
        let id_str = id.to_string();
        let path = recipe_image_path(original_filename);

        let result = self
            .db
            .query(
                "UPDATE type::record('recipe', $id) SET \
                 image = $image, updated_at = time::now() \
                 WHERE owner = $owner",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner", owner.to_string()))
            .bind(("image", path))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RecipeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "recipe".into(),
            id: id_str.clone(),
        })?;

        let ingredients = self.fetch_references("recipe_ingredient", &id_str).await?;
        let tags = self.fetch_references("recipe_tag", &id_str).await?;

        Ok(row.try_into_recipe(id, ingredients, tags)?)
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        pagination: Pagination,
    ) -> LarderResult<PaginatedResult<Recipe>> {
        let owner_str = owner.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM recipe \
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
                "SELECT meta::id(id) AS record_id, * FROM recipe \
                 WHERE owner = $owner \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner", owner_str.clone()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RecipeRowWithId> = result.take(0).map_err(DbError::from)?;

        let mut ingredient_map = self
            .fetch_owner_references("recipe_ingredient", &owner_str)
            .await?;
        let mut tag_map = self
            .fetch_owner_references("recipe_tag", &owner_str)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let id = parse_uuid(&row.record_id)?;
            let ingredients = ingredient_map.remove(&row.record_id).unwrap_or_default();
            let tags = tag_map.remove(&row.record_id).unwrap_or_default();
            let inner = RecipeRow {
                owner: row.owner,
                title: row.title,
                time_minutes: row.time_minutes,
                price: row.price,
                link: row.link,
                image: row.image,
                created_at: row.created_at,
                updated_at: row.updated_at,
            };
            items.push(inner.try_into_recipe(id, ingredients, tags)?);
        }

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
