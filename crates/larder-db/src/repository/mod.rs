//! SurrealDB repository implementations.

mod ingredient;
mod recipe;
mod tag;
mod token;
mod user;

pub use ingredient::SurrealIngredientRepository;
pub use recipe::SurrealRecipeRepository;
pub use tag::SurrealTagRepository;
pub use token::SurrealTokenRepository;
pub use user::SurrealUserRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// Whether a record with the given id exists in the given table.
pub(crate) async fn record_exists<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    id: &str,
) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM type::record($table, $id) GROUP ALL")
        .bind(("table", table.to_string()))
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
}

/// Fail with [`DbError::MissingReference`] unless the record exists.
pub(crate) async fn assert_reference<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    id: &str,
) -> Result<(), DbError> {
    if record_exists(db, table, id).await? {
        Ok(())
    } else {
        Err(DbError::MissingReference {
            entity: table.into(),
            id: id.into(),
        })
    }
}
