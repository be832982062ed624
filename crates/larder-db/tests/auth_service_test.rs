//! Integration tests for the authentication service over the real
//! SurrealDB repositories (in-memory engine).

use larder_auth::config::AuthConfig;
use larder_auth::service::AuthService;
use larder_core::error::LarderError;
use larder_core::models::user::{CreateUser, UpdateUser};
use larder_core::repository::UserRepository;
use larder_db::repository::{SurrealTokenRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type MemDb = surrealdb::engine::local::Db;

/// Spin up in-memory DB, run migrations, create an active user.
async fn setup() -> (
    SurrealUserRepository<MemDb>,
    SurrealTokenRepository<MemDb>,
    Uuid,
    Surreal<MemDb>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    larder_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            email: "alice@example.com".into(),
            password: "correct-horse-battery".into(),
            name: "Alice".into(),
        })
        .await
        .unwrap();

    let token_repo = SurrealTokenRepository::new(db.clone());

    (user_repo, token_repo, user.id, db)
}

fn service(
    user_repo: SurrealUserRepository<MemDb>,
    token_repo: SurrealTokenRepository<MemDb>,
) -> AuthService<SurrealUserRepository<MemDb>, SurrealTokenRepository<MemDb>> {
    AuthService::new(user_repo, token_repo, AuthConfig::default())
}

#[tokio::test]
async fn login_happy_path() {
    let (user_repo, token_repo, user_id, _db) = setup().await;
    let svc = service(user_repo.clone(), token_repo);

    let out = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    // 32 random bytes → 43 base64url chars.
    assert_eq!(out.token.len(), 43);
    assert_eq!(out.expires_in, AuthConfig::default().token_lifetime_secs);

    // Login stamps last_login.
    let user = user_repo.get_by_id(user_id).await.unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn login_normalizes_the_email() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    // Domain case and whitespace are normalized away; the stored
    // address was already lowercase.
    let result = svc
        .login("  alice@EXAMPLE.COM ", "correct-horse-battery")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn wrong_password_rejected() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let result = svc.login("alice@example.com", "wrong").await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn unknown_email_rejected() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let result = svc.login("nobody@example.com", "whatever").await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn inactive_account_rejected_despite_valid_credentials() {
    let (user_repo, token_repo, user_id, _db) = setup().await;
    user_repo
        .update(
            user_id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = service(user_repo, token_repo);
    let result = svc
        .login("alice@example.com", "correct-horse-battery")
        .await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn authenticate_resolves_the_user() {
    let (user_repo, token_repo, user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let out = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    let user = svc.authenticate(&out.token).await.unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn authenticate_rejects_unknown_tokens() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let result = svc.authenticate("made-up-token").await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn authenticate_rejects_tokens_of_deactivated_users() {
    let (user_repo, token_repo, user_id, _db) = setup().await;
    let svc = service(user_repo.clone(), token_repo);

    let out = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    user_repo
        .update(
            user_id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = svc.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn expired_tokens_are_rejected_and_revoked() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let config = AuthConfig {
        token_lifetime_secs: 0,
        ..Default::default()
    };
    let svc = AuthService::new(user_repo, token_repo, config);

    let out = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    let result = svc.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));

    // The expired token was dropped, so a retry fails identically.
    let result = svc.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (user_repo, token_repo, _user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let out = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();
    assert!(svc.authenticate(&out.token).await.is_ok());

    svc.logout(&out.token).await.unwrap();

    let result = svc.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(LarderError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn revoke_all_tokens_logs_out_every_session() {
    let (user_repo, token_repo, user_id, _db) = setup().await;
    let svc = service(user_repo, token_repo);

    let first = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();
    let second = svc
        .login("alice@example.com", "correct-horse-battery")
        .await
        .unwrap();

    svc.revoke_all_tokens(user_id).await.unwrap();

    assert!(svc.authenticate(&first.token).await.is_err());
    assert!(svc.authenticate(&second.token).await.is_err());
}
