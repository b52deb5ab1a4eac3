//! In-process credential store.
//!
//! Applies the same uniqueness rule as the PostgreSQL schema. Used by tests and
//! by local runs that have no database configured.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{CredentialStore, StoreError};
use crate::user_auth::models::{Session, UserRecord};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserRecord>,
    sessions: Vec<Session>,
    admins: HashSet<i64>,
    last_user_id: i64,
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    state: Mutex<MemoryState>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }

    /// Mark `user_id` as owning the admin role.
    pub fn grant_admin(&self, user_id: i64) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.users.values().any(|u| u.user_id == user_id) {
            return Err(StoreError::NotFound);
        }
        state.admins.insert(user_id);
        Ok(())
    }

    pub fn user(&self, username: &str) -> Option<UserRecord> {
        self.lock().ok()?.users.get(username).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|s| s.users.len()).unwrap_or(0)
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().map(|s| s.sessions.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_password_hash(&self, username: &str) -> Result<String, StoreError> {
        self.lock()?
            .users
            .get(username)
            .map(|u| u.password_hash.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        let mut state = self.lock()?;
        if state.users.contains_key(username) {
            return Err(StoreError::AlreadyExists);
        }

        state.last_user_id += 1;
        let user_id = state.last_user_id;
        state.users.insert(
            username.to_string(),
            UserRecord {
                user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user_id)
    }

    async fn save_session(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        // Mirrors the sessions.user_id foreign key
        if !state.users.values().any(|u| u.user_id == user_id) {
            return Err(StoreError::Database(format!(
                "session references unknown user_id {}",
                user_id
            )));
        }
        state.sessions.push(Session {
            user_id,
            token: token.to_string(),
        });
        Ok(())
    }

    async fn resolve_user_id(&self, username: &str) -> Result<i64, StoreError> {
        self.lock()?
            .users
            .get(username)
            .map(|u| u.user_id)
            .ok_or(StoreError::NotFound)
    }

    async fn find_session_user(&self, token: &str) -> Result<i64, StoreError> {
        self.lock()?
            .sessions
            .iter()
            .find(|s| s.token == token)
            .map(|s| s.user_id)
            .ok_or(StoreError::NotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.lock()?.admins.contains(&user_id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryCredentialStore::new();

        let id = store.create_user("alice", "hash-a").await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.find_password_hash("alice").await.unwrap(), "hash-a");
        assert_eq!(store.resolve_user_id("alice").await.unwrap(), 1);

        let id2 = store.create_user("bob", "hash-b").await.unwrap();
        assert_eq!(id2, 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryCredentialStore::new();
        store.create_user("alice", "original").await.unwrap();

        let result = store.create_user("alice", "replacement").await;
        assert_eq!(result, Err(StoreError::AlreadyExists));
        assert_eq!(
            store.find_password_hash("alice").await.unwrap(),
            "original",
            "Duplicate insert must not overwrite the stored hash"
        );
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let store = MemoryCredentialStore::new();
        store.create_user("alice", "h1").await.unwrap();
        store.create_user("Alice", "h2").await.unwrap();

        assert_eq!(store.user_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let store = MemoryCredentialStore::new();

        assert_eq!(
            store.find_password_hash("ghost").await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.resolve_user_id("ghost").await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_sessions() {
        let store = MemoryCredentialStore::new();
        let id = store.create_user("alice", "h").await.unwrap();

        store.save_session(id, "tok-1").await.unwrap();
        assert_eq!(store.find_session_user("tok-1").await.unwrap(), id);
        assert_eq!(
            store.find_session_user("tok-2").await,
            Err(StoreError::NotFound)
        );

        assert!(matches!(
            store.save_session(99, "tok-3").await,
            Err(StoreError::Database(_))
        ));
        assert_eq!(store.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_role() {
        let store = MemoryCredentialStore::new();
        let id = store.create_user("root", "h").await.unwrap();

        assert!(!store.is_admin(id).await.unwrap());
        store.grant_admin(id).unwrap();
        assert!(store.is_admin(id).await.unwrap());
        assert_eq!(store.grant_admin(42), Err(StoreError::NotFound));
    }
}
