/// Persistence seams consumed by the authentication core.
///
/// The core does not own user management or storage; it consumes a
/// principal-lookup capability and a refresh-token persistence capability
/// through the traits below. `MemoryStore` backs embedding and tests,
/// `PgAuthStore` backs production deployments.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAuthStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::StoreError;

/// An authenticated subject as the user-management subsystem sees it.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    /// Role names; set semantics, duplicates tolerated on input.
    pub roles: Vec<String>,
}

/// Persisted refresh-token record.
///
/// `token_hash` is the SHA-256 hex digest of the opaque token value; the
/// plaintext is never stored. Only `revoked` is ever mutated after insert.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub token_hash: String,
    pub principal_id: i64,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(
        principal_id: i64,
        token_hash: String,
        now: DateTime<Utc>,
        lifetime_days: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            principal_id,
            expires_at: now + Duration::days(lifetime_days),
            revoked: false,
            created_at: now,
        }
    }

    /// Active means neither revoked nor past expiry. Both terminal states
    /// are indistinguishable to the redeem caller.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at >= now
    }
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Exact, case-sensitive username match. Roles are loaded eagerly.
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError>;

    /// Lookup by id, with the current role set (not frozen at login time).
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new record atomically; the caller returns tokens to the
    /// client only after this commits.
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    /// Exact match on the token hash.
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Set the revoked flag. Idempotent; unknown hashes are a no-op.
    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}

// One shared store instance can serve both seams.
#[async_trait]
impl<T: PrincipalStore + ?Sized> PrincipalStore for Arc<T> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, StoreError> {
        (**self).find_by_id(id).await
    }
}

#[async_trait]
impl<T: RefreshTokenStore + ?Sized> RefreshTokenStore for Arc<T> {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        (**self).find_by_token_hash(token_hash).await
    }

    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).revoke(token_hash, at).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_expiring_in_days(days: i64) -> RefreshTokenRecord {
        RefreshTokenRecord::new(1, "hash".to_string(), Utc::now(), days)
    }

    #[test]
    fn test_new_record_is_active() {
        let record = record_expiring_in_days(7);

        assert!(!record.revoked);
        assert!(record.is_active(Utc::now()));
    }

    #[test]
    fn test_expiry_is_created_at_plus_lifetime() {
        let now = Utc::now();
        let record = RefreshTokenRecord::new(1, "hash".to_string(), now, 7);

        assert_eq!(record.expires_at, now + Duration::days(7));
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn test_record_past_expiry_is_inactive() {
        let record = record_expiring_in_days(7);

        assert!(!record.is_active(record.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_revoked_record_is_inactive_before_expiry() {
        let mut record = record_expiring_in_days(7);
        record.revoked = true;

        assert!(!record.is_active(Utc::now()));
    }
}
