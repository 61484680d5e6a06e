/// In-process store
///
/// Backs embedding scenarios and the integration test suite. Mirrors the
/// Postgres store's semantics: exact-match lookups, revocation as a flag
/// update, no eager purging of expired rows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{Principal, PrincipalStore, RefreshTokenRecord, RefreshTokenStore};

#[derive(Default)]
pub struct MemoryStore {
    principals: RwLock<HashMap<i64, Principal>>,
    tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_principal(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id, principal);
    }

    /// Replace a principal's role set, as the external user-management
    /// subsystem would between a login and a later refresh.
    pub async fn set_roles(&self, principal_id: i64, roles: Vec<String>) {
        if let Some(principal) = self.principals.write().await.get_mut(&principal_id) {
            principal.roles = roles;
        }
    }

}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .find(|p| p.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, StoreError> {
        Ok(self.principals.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&record.token_hash) {
            return Err(StoreError::Conflict("refresh token already stored".to_string()));
        }
        tokens.insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str, _at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(record) = self.tokens.write().await.get_mut(token_hash) {
            record.revoked = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            roles: vec!["Admin".to_string()],
        }
    }

    #[tokio::test]
    async fn test_username_lookup_is_exact_match() {
        let store = MemoryStore::new();
        store.add_principal(principal()).await;

        assert!(store.find_by_username("admin").await.unwrap().is_some());
        assert!(store.find_by_username("Admin").await.unwrap().is_none());
        assert!(store.find_by_username("adm").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_then_find_round_trips() {
        let store = MemoryStore::new();
        let record = RefreshTokenRecord::new(1, "abc123".to_string(), Utc::now(), 7);

        store.insert(&record).await.unwrap();
        let found = store.find_by_token_hash("abc123").await.unwrap().unwrap();

        assert_eq!(found.id, record.id);
        assert_eq!(found.principal_id, 1);
        assert!(!found.revoked);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        let record = RefreshTokenRecord::new(1, "abc123".to_string(), Utc::now(), 7);

        store.insert(&record).await.unwrap();
        let result = store.insert(&record).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_revoke_sets_flag_and_keeps_row() {
        let store = MemoryStore::new();
        let record = RefreshTokenRecord::new(1, "abc123".to_string(), Utc::now(), 7);
        store.insert(&record).await.unwrap();

        store.revoke("abc123", Utc::now()).await.unwrap();
        let found = store.find_by_token_hash("abc123").await.unwrap().unwrap();

        assert!(found.revoked);
    }

    #[tokio::test]
    async fn test_revoke_unknown_hash_is_noop() {
        let store = MemoryStore::new();

        assert!(store.revoke("missing", Utc::now()).await.is_ok());
    }
}
