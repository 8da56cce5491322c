//! UseCase: ログイン / サインアップ
//!
//! 未登録のユーザー名なら新規作成し、登録済みならパスワードを照合する。

use std::sync::Arc;

use crate::domain::{CredentialStore, DisplayName};

use super::error::LoginError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Created,
    LoggedIn,
}

pub struct LoginUseCase {
    credential_store: Arc<dyn CredentialStore>,
}

impl LoginUseCase {
    pub fn new(credential_store: Arc<dyn CredentialStore>) -> Self {
        Self { credential_store }
    }

    pub async fn execute(&self, username: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        if !DisplayName::is_account_name(username) {
            return Err(LoginError::InvalidUsername);
        }

        match self.credential_store.password_of(username).await? {
            None => {
                if self.credential_store.create_user(username, password).await? {
                    Ok(LoginOutcome::Created)
                } else {
                    // 同時サインアップで先を越された場合は照合し直す
                    self.verify(username, password).await
                }
            }
            Some(stored) if stored == password => Ok(LoginOutcome::LoggedIn),
            Some(_) => Err(LoginError::IncorrectPassword),
        }
    }

    async fn verify(&self, username: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        match self.credential_store.password_of(username).await? {
            Some(stored) if stored == password => Ok(LoginOutcome::LoggedIn),
            _ => Err(LoginError::IncorrectPassword),
        }
    }
}
