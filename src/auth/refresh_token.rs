/// Refresh Token Generation
///
/// Opaque long-lived token values:
/// - 64 random alphanumeric characters from a CSPRNG (~381 bits of entropy)
/// - hashed with SHA-256 before storage; the plaintext only ever goes to
///   the client

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

pub const REFRESH_TOKEN_LEN: usize = 64;

/// Generate a new opaque refresh-token value.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a token value; the store's lookup key.
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
