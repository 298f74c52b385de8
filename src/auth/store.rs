use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Demo accounts inserted at startup when seeding is enabled.
pub const DEMO_ACCOUNTS: &[(&str, &str)] = &[
    ("admin", "admin123"),
    ("user01", "password1"),
    ("user02", "password2"),
    ("user03", "password3"),
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Backend(String),
}

/// Username → password hash mapping. Entries are only ever inserted.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<String>, StoreError>;

    async fn exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Inserts if absent. Returns `false` when the username is already taken.
    async fn put(&self, username: &str, password_hash: String) -> Result<bool, StoreError>;
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<String>, StoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.read().await.contains_key(username))
    }

    async fn put(&self, username: &str, password_hash: String) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(username) {
            return Ok(false);
        }
        accounts.insert(username.to_string(), password_hash);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_is_insert_if_absent() {
        let store = MemoryCredentialStore::new();
        assert!(store.put("alice", "h1".into()).await.unwrap());
        assert!(!store.put("alice", "h2".into()).await.unwrap());
        assert_eq!(store.get("alice").await.unwrap().as_deref(), Some("h1"));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn unknown_user_is_absent() {
        let store = MemoryCredentialStore::new();
        assert!(!store.exists("nobody").await.unwrap());
        assert!(store.get("nobody").await.unwrap().is_none());
    }
}
