use log::debug;

use crate::config::ConfigError;
use crate::error::AppError;

/// Salted bcrypt hashing with a cost fixed at startup.
///
/// Both operations are deliberately slow. Call them from the blocking pool
/// (`actix_web::web::block`), never from an async task directly.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Verified against when the email is unknown, so that path costs a full bcrypt round.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, ConfigError> {
        let dummy_hash = bcrypt::hash("tasklist-dummy-password", cost).map_err(|e| ConfigError::Invalid {
            key: "BCRYPT_COST",
            reason: e.to_string(),
        })?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hashes `plaintext` with a fresh random salt. Empty input is rejected.
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        if plaintext.is_empty() {
            return Err(AppError::ValidationError("password must not be empty".into()));
        }
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Returns `true` only when `plaintext` matches `stored_hash`.
    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, stored_hash: &str, plaintext: &str) -> bool {
        match bcrypt::verify(plaintext, stored_hash) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Spends the same work as [`verify`](Self::verify) and always returns `false`.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = bcrypt::verify(plaintext, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).unwrap()
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = hasher();
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(&hashed, password));
        assert!(!hasher.verify(&hashed, "wrong_password"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("same password").unwrap();
        let second = hasher.hash("same password").unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), second.len());
        assert!(hasher.verify(&first, "same password"));
        assert!(hasher.verify(&second, "same password"));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let hasher = hasher();
        assert!(!hasher.verify("invalidhashformat", "test_password123"));
        assert!(!hasher.verify("", "test_password123"));
    }

    #[test]
    fn test_empty_password_is_rejected() {
        assert!(matches!(hasher().hash(""), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_dummy_never_matches() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy("tasklist-dummy-password"));
    }

    #[test]
    fn test_invalid_cost_is_a_config_error() {
        assert!(PasswordHasher::new(2).is_err());
    }
}
