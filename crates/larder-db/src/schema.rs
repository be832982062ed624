//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. The recipe↔ingredient and recipe↔tag
//! junctions are RELATION tables.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (email is the identity)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD is_staff ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD is_superuser ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD last_login ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Tags (owner scope)
-- =======================================================================
DEFINE TABLE tag SCHEMAFULL;
DEFINE FIELD name ON TABLE tag TYPE string;
DEFINE FIELD owner ON TABLE tag TYPE string;
DEFINE FIELD created_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tag_owner ON TABLE tag COLUMNS owner;

-- =======================================================================
-- Ingredients (owner scope)
-- =======================================================================
DEFINE TABLE ingredient SCHEMAFULL;
DEFINE FIELD name ON TABLE ingredient TYPE string;
DEFINE FIELD owner ON TABLE ingredient TYPE string;
DEFINE FIELD created_at ON TABLE ingredient TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ingredient TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ingredient_owner ON TABLE ingredient COLUMNS owner;

-- =======================================================================
-- Recipes (owner scope)
-- =======================================================================
DEFINE TABLE recipe SCHEMAFULL;
DEFINE FIELD owner ON TABLE recipe TYPE string;
DEFINE FIELD title ON TABLE recipe TYPE string;
DEFINE FIELD time_minutes ON TABLE recipe TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD price ON TABLE recipe TYPE decimal;
DEFINE FIELD link ON TABLE recipe TYPE option<string>;
DEFINE FIELD image ON TABLE recipe TYPE option<string>;
DEFINE FIELD created_at ON TABLE recipe TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE recipe TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_recipe_owner ON TABLE recipe COLUMNS owner;

-- =======================================================================
-- Bearer tokens (digest only, never the raw token)
-- =======================================================================
DEFINE TABLE api_token SCHEMAFULL;
DEFINE FIELD user ON TABLE api_token TYPE string;
DEFINE FIELD token_hash ON TABLE api_token TYPE string;
DEFINE FIELD expires_at ON TABLE api_token TYPE datetime;
DEFINE FIELD created_at ON TABLE api_token TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_token_hash ON TABLE api_token \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_token_user ON TABLE api_token COLUMNS user;

-- =======================================================================
-- Junction Tables (recipe relations)
-- =======================================================================

-- Recipe -> Ingredient references
DEFINE TABLE recipe_ingredient TYPE RELATION SCHEMAFULL;

-- Recipe -> Tag references
DEFINE TABLE recipe_tag TYPE RELATION SCHEMAFULL;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
