//! Migration runner tests against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct MigrationRow {
    version: u32,
    name: String,
}

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn migrations_apply_cleanly() {
    let db = setup().await;
    larder_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version ASC")
        .await
        .unwrap();
    let rows: Vec<MigrationRow> = result.take(0).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].version, 1);
    assert_eq!(rows[0].name, "initial_schema");
}

#[tokio::test]
async fn rerunning_migrations_is_idempotent() {
    let db = setup().await;
    larder_db::run_migrations(&db).await.unwrap();
    larder_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let rows: Vec<MigrationRow> = result.take(0).unwrap();
    assert_eq!(rows.len(), 1);
}
