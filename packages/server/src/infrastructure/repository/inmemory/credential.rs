//! In-memory credential store.
//!
//! Accounts live only in process memory: they are lost when the server
//! restarts, and users sign up again through `POST /api/login`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{AuthError, CredentialStore};

/// Username → password map.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the given users.
    pub fn with_users<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: Mutex::new(
                users
                    .into_iter()
                    .map(|(u, p)| (u.into(), p.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn password_of(&self, username: &str) -> Result<Option<String>, AuthError> {
        Ok(self.users.lock().await.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let mut users = self.users.lock().await;
        if users.contains_key(username) {
            return Ok(false);
        }
        users.insert(username.to_string(), password.to_string());
        tracing::info!("Created user '{}'", username);
        Ok(true)
    }
}
