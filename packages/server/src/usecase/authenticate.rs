//! UseCase: 認証
//!
//! join 前に username / password を CredentialStore で検証する。

use std::sync::Arc;

use crate::domain::{AuthError, CredentialStore};

pub struct AuthenticateUseCase {
    credential_store: Arc<dyn CredentialStore>,
}

impl AuthenticateUseCase {
    pub fn new(credential_store: Arc<dyn CredentialStore>) -> Self {
        Self { credential_store }
    }

    /// 認証を実行
    ///
    /// * `Err(AuthError::MissingCredentials)` - username か password が空
    /// * `Err(AuthError::InvalidCredentials)` - 未登録ユーザーまたはパスワード不一致
    /// * `Err(AuthError::Store)` - ストアの障害
    pub async fn execute(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        match self.credential_store.password_of(username).await? {
            Some(stored) if stored == password => Ok(()),
            Some(_) => {
                tracing::warn!("Incorrect password for username: {}", username);
                Err(AuthError::InvalidCredentials)
            }
            None => {
                tracing::warn!("Invalid username: {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
