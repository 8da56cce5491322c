//! Credential store trait.

use async_trait::async_trait;

use super::AuthError;

/// Persistent username → password store used for join authentication and
/// the login endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored password of `username`, or `None` for an unknown user.
    async fn password_of(&self, username: &str) -> Result<Option<String>, AuthError>;

    /// Create a user. Returns `false` when the user already exists.
    async fn create_user(&self, username: &str, password: &str) -> Result<bool, AuthError>;
}
