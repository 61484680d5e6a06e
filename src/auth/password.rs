/// Password Hashing and Verification
///
/// The slow-hash capability behind credential verification. The trait keeps
/// the concrete algorithm swappable without touching the login logic;
/// `BcryptHasher` is the default.

use bcrypt::DEFAULT_COST;

use crate::error::AppError;

pub trait SlowHasher: Send + Sync {
    /// Produce a salted digest of the plaintext.
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    /// Check the plaintext against a stored digest.
    ///
    /// Returns Ok(false) for a mismatch; Err only when the digest itself is
    /// unusable or hashing fails.
    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError>;
}

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Lower cost for test suites; production callers use `new`.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl SlowHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
        bcrypt::verify(plaintext, digest)
            .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 is the bcrypt minimum; keeps the suite fast.
    fn hasher() -> BcryptHasher {
        BcryptHasher::with_cost(4)
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let digest = hasher().hash("Admin@123").expect("Failed to hash");

        assert_ne!(digest, "Admin@123");
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_verify_correct_password() {
        let h = hasher();
        let digest = h.hash("Admin@123").expect("Failed to hash");

        assert!(h.verify("Admin@123", &digest).expect("Failed to verify"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let h = hasher();
        let digest = h.hash("Admin@123").expect("Failed to hash");

        assert!(!h.verify("WrongPass", &digest).expect("Failed to verify"));
    }

    #[test]
    fn test_empty_password_is_attempted_and_fails() {
        let h = hasher();
        let digest = h.hash("Admin@123").expect("Failed to hash");

        assert!(!h.verify("", &digest).expect("Failed to verify"));
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        assert!(hasher().verify("Admin@123", "not-a-bcrypt-digest").is_err());
    }
}
