//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Bearer token lifetime in seconds (default: 2_592_000 = 30 days).
    pub token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: 2_592_000,
            pepper: None,
        }
    }
}
