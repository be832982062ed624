//! Integration tests for the bearer token repository using in-memory
//! SurrealDB.

use chrono::{Duration, Utc};
use larder_auth::token::hash_token;
use larder_core::error::LarderError;
use larder_core::models::token::CreateApiToken;
use larder_core::models::user::CreateUser;
use larder_core::repository::{TokenRepository, UserRepository};
use larder_db::repository::{SurrealTokenRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a user.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    larder_db::run_migrations(&db).await.unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: "holder@example.com".into(),
            password: "pass123".into(),
            name: String::new(),
        })
        .await
        .unwrap();

    (db, user.id)
}

#[tokio::test]
async fn create_and_lookup_by_hash() {
    let (db, user) = setup().await;
    let repo = SurrealTokenRepository::new(db);

    let hash = hash_token("raw-token");
    let token = repo
        .create(CreateApiToken {
            user,
            token_hash: hash.clone(),
            expires_at: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();

    assert_eq!(token.user, user);
    assert_eq!(token.token_hash, hash);

    let fetched = repo.get_by_hash(&hash).await.unwrap();
    assert_eq!(fetched.id, token.id);

    let missing = repo.get_by_hash(&hash_token("other")).await;
    assert!(matches!(missing, Err(LarderError::NotFound { .. })));
}

#[tokio::test]
async fn revoke_drops_a_single_token() {
    let (db, user) = setup().await;
    let repo = SurrealTokenRepository::new(db);

    let hash = hash_token("short-lived");
    let token = repo
        .create(CreateApiToken {
            user,
            token_hash: hash.clone(),
            expires_at: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();

    repo.revoke(token.id).await.unwrap();

    let result = repo.get_by_hash(&hash).await;
    assert!(matches!(result, Err(LarderError::NotFound { .. })));
}

#[tokio::test]
async fn cleanup_drops_only_expired_tokens() {
    let (db, user) = setup().await;
    let repo = SurrealTokenRepository::new(db);

    let expired_hash = hash_token("expired");
    repo.create(CreateApiToken {
        user,
        token_hash: expired_hash.clone(),
        expires_at: Utc::now() - Duration::days(1),
    })
    .await
    .unwrap();

    let live_hash = hash_token("live");
    repo.create(CreateApiToken {
        user,
        token_hash: live_hash.clone(),
        expires_at: Utc::now() + Duration::days(1),
    })
    .await
    .unwrap();

    let dropped = repo.cleanup_expired().await.unwrap();
    assert_eq!(dropped, 1);

    assert!(repo.get_by_hash(&live_hash).await.is_ok());
    let result = repo.get_by_hash(&expired_hash).await;
    assert!(matches!(result, Err(LarderError::NotFound { .. })));
}
