/// Access Token Issuer
///
/// Builds and signs the short-lived, self-contained claims token. Issuance
/// is deterministic given (principal, now, settings); the signature is
/// recomputed on every call, never cached.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::Principal;

/// Issue a signed access token for a principal.
///
/// HMAC-SHA-256 over the default header and the claim set built at `now`.
/// Key sizing is enforced by `JwtSettings::validate` at startup, not here.
pub fn issue_access_token(
    principal: &Principal,
    now: DateTime<Utc>,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(principal, now, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Verify signature, expiry, issuer, and audience, and return the claims.
///
/// This is the downstream request-authenticator's check; `login` and
/// `refresh` never call it on tokens they just issued.
pub fn decode_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "access token rejected");
        AppError::Internal("invalid or expired access token".to_string())
    })
}
