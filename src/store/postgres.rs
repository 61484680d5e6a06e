/// Postgres store
///
/// Schema lives in `migrations/`. Refresh-token inserts run inside an
/// explicit transaction so the login-time write commits atomically; a
/// cancelled request rolls back and leaves nothing half-written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{Principal, PrincipalStore, RefreshTokenRecord, RefreshTokenStore};

pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_roles(&self, principal_id: i64) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

#[async_trait]
impl PrincipalStore for PgAuthStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        match row {
            None => Ok(None),
            Some((id, username, password_hash)) => {
                let roles = self.load_roles(id).await?;
                Ok(Some(Principal {
                    id,
                    username,
                    password_hash,
                    roles,
                }))
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        match row {
            None => Ok(None),
            Some((id, username, password_hash)) => {
                let roles = self.load_roles(id).await?;
                Ok(Some(Principal {
                    id,
                    username,
                    password_hash,
                    roles,
                }))
            }
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PgAuthStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, is_revoked, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.principal_id)
        .bind(&record.token_hash)
        .bind(record.expires_at)
        .bind(record.revoked)
        .bind(record.created_at)
        .execute(&mut tx)
        .await
        .map_err(StoreError::from)?;

        tx.commit().await.map_err(StoreError::from)?;
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, i64, DateTime<Utc>, bool, DateTime<Utc>)>(
            r#"
            SELECT id, user_id, expires_at, is_revoked, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.map(
            |(id, principal_id, expires_at, revoked, created_at)| RefreshTokenRecord {
                id,
                token_hash: token_hash.to_string(),
                principal_id,
                expires_at,
                revoked,
                created_at,
            },
        ))
    }

    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = true, revoked_at = $1
            WHERE token_hash = $2 AND is_revoked = false
            "#,
        )
        .bind(at)
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(())
    }
}
