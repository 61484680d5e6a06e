/// Authentication service
///
/// Orchestrates credential verification, access-token issuance, and
/// refresh-token lifecycle over the store seams. This is the surface the
/// HTTP layer consumes; it returns typed failure kinds, never user-facing
/// text.

use chrono::{DateTime, Utc};

use crate::auth::jwt::issue_access_token;
use crate::auth::password::{BcryptHasher, SlowHasher};
use crate::auth::refresh_token::{generate_refresh_token, hash_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};
use crate::store::{Principal, PrincipalStore, RefreshTokenRecord, RefreshTokenStore};

/// The credential pair a successful login returns.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService<P, R, H = BcryptHasher> {
    principals: P,
    refresh_tokens: R,
    hasher: H,
    jwt: JwtSettings,
}

impl<P, R, H> AuthService<P, R, H>
where
    P: PrincipalStore,
    R: RefreshTokenStore,
    H: SlowHasher,
{
    /// Settings are validated here once; issuance never re-checks them.
    pub fn new(
        principals: P,
        refresh_tokens: R,
        hasher: H,
        jwt: JwtSettings,
    ) -> Result<Self, ConfigError> {
        jwt.validate()?;
        Ok(Self {
            principals,
            refresh_tokens,
            hasher,
            jwt,
        })
    }

    /// Authenticate by password and issue an (access, refresh) pair.
    ///
    /// Unknown username and wrong password both return
    /// `AuthError::InvalidCredentials`; the caller cannot tell them apart.
    /// The pair is returned only after the refresh-token insert commits, so
    /// a login never hands out an access token without its persisted
    /// refresh token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let principal = self.verify_credentials(username, password).await?;

        let access_token = issue_access_token(&principal, now, &self.jwt)?;
        let refresh_token = generate_refresh_token();

        let record = RefreshTokenRecord::new(
            principal.id,
            hash_token(&refresh_token),
            now,
            self.jwt.refresh_token_lifetime_days,
        );
        self.refresh_tokens.insert(&record).await?;

        tracing::info!(principal_id = principal.id, "login succeeded");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Redeem a refresh token for a new access token.
    ///
    /// Absent, revoked, and expired tokens all return
    /// `AuthError::InvalidRefreshToken`. Roles are re-read at redeem time;
    /// a role change since login shows up in the new token. The presented
    /// token is NOT rotated or revoked and stays redeemable until it
    /// expires or is explicitly revoked.
    pub async fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let principal = self.redeem(token, now).await?;
        issue_access_token(&principal, now, &self.jwt)
    }

    /// Set the revoked flag on a stored token. Irreversible.
    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        self.refresh_tokens
            .revoke(&hash_token(token), now)
            .await
            .map_err(AppError::from)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, AppError> {
        let principal = match self.principals.find_by_username(username).await? {
            Some(principal) => principal,
            None => {
                tracing::warn!("login attempt for unknown username");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(password, &principal.password_hash)? {
            tracing::warn!(principal_id = principal.id, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(principal)
    }

    async fn redeem(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AppError> {
        let record = match self
            .refresh_tokens
            .find_by_token_hash(&hash_token(token))
            .await?
        {
            Some(record) => record,
            None => {
                tracing::warn!("refresh attempt with unknown token");
                return Err(AuthError::InvalidRefreshToken.into());
            }
        };

        if !record.is_active(now) {
            tracing::warn!(
                principal_id = record.principal_id,
                revoked = record.revoked,
                "refresh attempt with inactive token"
            );
            return Err(AuthError::InvalidRefreshToken.into());
        }

        // A principal deleted since login gets the same uniform error.
        match self.principals.find_by_id(record.principal_id).await? {
            Some(principal) => Ok(principal),
            None => {
                tracing::warn!(
                    principal_id = record.principal_id,
                    "refresh token references a missing principal"
                );
                Err(AuthError::InvalidRefreshToken.into())
            }
        }
    }
}
