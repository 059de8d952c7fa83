pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{IssuedToken, TokenError, TokenService, VerifiedClaims};

lazy_static! {
    // At least one non-whitespace character.
    static ref NON_BLANK_REGEX: regex::Regex = regex::Regex::new(r"\S").unwrap();
}

/// Represents the payload for a user login request.
///
/// Not validated beyond deserialization: every failure, malformed or not,
/// is reported as invalid credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Must be a valid email format. Stored lower-cased.
    #[validate(email)]
    pub email: String,
    /// Display name. Required, at most 100 characters.
    #[validate(
        length(min = 1, max = 100),
        regex(path = "NON_BLANK_REGEX", message = "Name must not be blank")
    )]
    pub name: String,
    /// Between 6 and 72 characters; bcrypt ignores anything past 72 bytes.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The signed JWT to present as `Authorization: Bearer <token>`.
    pub token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    /// The unique identifier of the authenticated user.
    pub user_id: i32,
}

/// Emails compare case-insensitively; this is the canonical stored form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn signup(email: &str, name: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_signup_request_validation() {
        assert!(signup("test@example.com", "Ann", "password123").validate().is_ok());
        assert!(signup("testexample.com", "Ann", "password123").validate().is_err());
        assert!(signup("test@example.com", "", "password123").validate().is_err());
        assert!(signup("test@example.com", "   ", "password123").validate().is_err());
        assert!(signup("test@example.com", &"n".repeat(101), "password123").validate().is_err());
        assert!(signup("test@example.com", "Ann", "123").validate().is_err());
        assert!(signup("test@example.com", "Ann", &"p".repeat(73)).validate().is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }
}
