//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Catalog repositories are
//! owner-scoped: reads and writes require the owning user's id and
//! cannot reach another user's rows.

use uuid::Uuid;

use crate::error::LarderResult;
use crate::models::{
    ingredient::{CreateIngredient, Ingredient, UpdateIngredient},
    recipe::{CreateRecipe, Recipe, UpdateRecipe},
    tag::{CreateTag, Tag, UpdateTag},
    token::{ApiToken, CreateApiToken},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The sole creation and mutation path for user records.
///
/// Implementations must normalize emails, hash passwords, and reject
/// creation without an email address.
pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = LarderResult<User>> + Send;
    /// Delegates to `create`, then persists a second update setting
    /// `is_staff` and `is_superuser`.
    fn create_superuser(
        &self,
        input: CreateUser,
    ) -> impl Future<Output = LarderResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LarderResult<User>> + Send;
    /// Lookup by already-normalized email.
    fn get_by_email(&self, email: &str) -> impl Future<Output = LarderResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = LarderResult<User>> + Send;
    /// Hard delete. Cascades to the user's tags, ingredients, recipes,
    /// tokens, and every junction edge touching the removed rows.
    fn delete(&self, id: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LarderResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Owner-scoped catalog
// ---------------------------------------------------------------------------

pub trait TagRepository: Send + Sync {
    fn create(&self, input: CreateTag) -> impl Future<Output = LarderResult<Tag>> + Send;
    fn get_by_id(&self, owner: Uuid, id: Uuid) -> impl Future<Output = LarderResult<Tag>> + Send;
    fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateTag,
    ) -> impl Future<Output = LarderResult<Tag>> + Send;
    /// Removes the tag and any recipe junction edges referencing it.
    fn delete(&self, owner: Uuid, id: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    fn list_by_owner(
        &self,
        owner: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = LarderResult<PaginatedResult<Tag>>> + Send;
}

pub trait IngredientRepository: Send + Sync {
    fn create(
        &self,
        input: CreateIngredient,
    ) -> impl Future<Output = LarderResult<Ingredient>> + Send;
    fn get_by_id(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LarderResult<Ingredient>> + Send;
    fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateIngredient,
    ) -> impl Future<Output = LarderResult<Ingredient>> + Send;
    /// Removes the ingredient and any recipe junction edges referencing it.
    fn delete(&self, owner: Uuid, id: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    fn list_by_owner(
        &self,
        owner: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = LarderResult<PaginatedResult<Ingredient>>> + Send;
}

pub trait RecipeRepository: Send + Sync {
    /// The owner and every referenced ingredient/tag must exist;
    /// references may belong to any user.
    fn create(&self, input: CreateRecipe) -> impl Future<Output = LarderResult<Recipe>> + Send;
    fn get_by_id(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LarderResult<Recipe>> + Send;
    fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateRecipe,
    ) -> impl Future<Output = LarderResult<Recipe>> + Send;
    fn delete(&self, owner: Uuid, id: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    /// Stores a freshly generated upload path for the given original
    /// filename and returns the updated recipe.
    fn set_image(
        &self,
        owner: Uuid,
        id: Uuid,
        original_filename: &str,
    ) -> impl Future<Output = LarderResult<Recipe>> + Send;
    fn list_by_owner(
        &self,
        owner: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = LarderResult<PaginatedResult<Recipe>>> + Send;
}

// ---------------------------------------------------------------------------
// Bearer tokens
// ---------------------------------------------------------------------------

pub trait TokenRepository: Send + Sync {
    fn create(
        &self,
        input: CreateApiToken,
    ) -> impl Future<Output = LarderResult<ApiToken>> + Send;
    fn get_by_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = LarderResult<ApiToken>> + Send;
    /// Invalidate a single token.
    fn revoke(&self, id: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    /// Invalidate all tokens for a user (e.g. on password change).
    fn revoke_user_tokens(&self, user: Uuid) -> impl Future<Output = LarderResult<()>> + Send;
    /// Remove all expired tokens, returning how many were dropped.
    fn cleanup_expired(&self) -> impl Future<Output = LarderResult<u64>> + Send;
}
