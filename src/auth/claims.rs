/// JWT Claims structure
///
/// Payload of an access token: identity, role set, and the standard
/// registered claims (RFC 7519).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::Principal;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (principal id, stringified)
    pub sub: String,
    /// Subject username
    pub name: String,
    /// Role names; deduplicated, order not significant
    pub roles: Vec<String>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for a principal at `now`.
    ///
    /// Expiry is exactly `now + access_token_lifetime_minutes`. Duplicate
    /// role names on the principal collapse to a single role claim.
    pub fn new(principal: &Principal, now: DateTime<Utc>, config: &JwtSettings) -> Self {
        let roles: Vec<String> = principal
            .roles
            .iter()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let iat = now.timestamp();
        Self {
            sub: principal.id.to_string(),
            name: principal.username.clone(),
            roles,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat,
            exp: iat + config.access_token_lifetime_minutes * 60,
        }
    }

    /// Extract the principal id from the subject claim.
    pub fn principal_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::Internal("invalid principal id in token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "auth-core".to_string(),
            audience: "auth-core-clients".to_string(),
            access_token_lifetime_minutes: 15,
            refresh_token_lifetime_days: 7,
        }
    }

    fn admin_principal(roles: Vec<&str>) -> Principal {
        Principal {
            id: 42,
            username: "admin".to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            roles: roles.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_claims_carry_identity_and_roles() {
        let claims = Claims::new(&admin_principal(vec!["Admin"]), Utc::now(), &test_config());

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "admin");
        assert_eq!(claims.roles, vec!["Admin".to_string()]);
        assert_eq!(claims.iss, "auth-core");
        assert_eq!(claims.aud, "auth-core-clients");
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let principal = admin_principal(vec!["Admin", "Auditor", "Admin"]);
        let claims = Claims::new(&principal, Utc::now(), &test_config());

        assert_eq!(
            claims.roles,
            vec!["Admin".to_string(), "Auditor".to_string()]
        );
    }

    #[test]
    fn test_expiry_is_issued_at_plus_lifetime() {
        let now = Utc::now();
        let claims = Claims::new(&admin_principal(vec!["Admin"]), now, &test_config());

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_principal_id_extraction() {
        let claims = Claims::new(&admin_principal(vec![]), Utc::now(), &test_config());

        assert_eq!(claims.principal_id().unwrap(), 42);
    }

    #[test]
    fn test_invalid_subject_is_an_error() {
        let mut claims = Claims::new(&admin_principal(vec![]), Utc::now(), &test_config());
        claims.sub = "not-a-number".to_string();

        assert!(claims.principal_id().is_err());
    }
}
