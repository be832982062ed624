//! Authentication service — login, token validation, and logout.

use chrono::{Duration, Utc};
use larder_core::email::normalize_email;
use larder_core::error::{LarderError, LarderResult};
use larder_core::models::token::CreateApiToken;
use larder_core::models::user::{UpdateUser, User};
use larder_core::repository::{TokenRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Raw opaque bearer token (returned to the client, not stored).
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<U: UserRepository, T: TokenRepository> {
    user_repo: U,
    token_repo: T,
    config: AuthConfig,
}

impl<U: UserRepository, T: TokenRepository> AuthService<U, T> {
    pub fn new(user_repo: U, token_repo: T, config: AuthConfig) -> Self {
        Self {
            user_repo,
            token_repo,
            config,
        }
    }

    /// Authenticate with email + password and issue a bearer token.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller. Inactive accounts are rejected even with valid
    /// credentials.
    pub async fn login(&self, email: &str, password: &str) -> LarderResult<LoginOutput> {
        let email = normalize_email(email);
        let user = match self.user_repo.get_by_email(&email).await {
            Ok(u) => u,
            Err(LarderError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let raw = token::generate_token();
        let expires_at = Utc::now() + Duration::seconds(self.config.token_lifetime_secs as i64);
        self.token_repo
            .create(CreateApiToken {
                user: user.id,
                token_hash: token::hash_token(&raw),
                expires_at,
            })
            .await?;

        self.user_repo
            .update(
                user.id,
                UpdateUser {
                    last_login: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(LoginOutput {
            token: raw,
            expires_in: self.config.token_lifetime_secs,
        })
    }

    /// Resolve a raw bearer token to its user.
    ///
    /// Expired tokens are revoked on sight and rejected.
    pub async fn authenticate(&self, raw_token: &str) -> LarderResult<User> {
        let hash = token::hash_token(raw_token);
        let api_token = match self.token_repo.get_by_hash(&hash).await {
            Ok(t) => t,
            Err(LarderError::NotFound { .. }) => return Err(AuthError::TokenInvalid.into()),
            Err(e) => return Err(e),
        };

        if api_token.expires_at <= Utc::now() {
            self.token_repo.revoke(api_token.id).await?;
            return Err(AuthError::TokenExpired.into());
        }

        let user = self.user_repo.get_by_id(api_token.user).await?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        Ok(user)
    }

    /// Invalidate a single bearer token (logout).
    pub async fn logout(&self, raw_token: &str) -> LarderResult<()> {
        let hash = token::hash_token(raw_token);
        let api_token = match self.token_repo.get_by_hash(&hash).await {
            Ok(t) => t,
            Err(LarderError::NotFound { .. }) => return Err(AuthError::TokenInvalid.into()),
            Err(e) => return Err(e),
        };
        self.token_repo.revoke(api_token.id).await
    }

    /// Revoke every token a user holds (e.g. on password change).
    pub async fn revoke_all_tokens(&self, user: uuid::Uuid) -> LarderResult<()> {
        self.token_repo.revoke_user_tokens(user).await
    }
}
