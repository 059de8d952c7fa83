use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, JwtSettings};
use crate::error::AppError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a token was rejected. Logged server-side, never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("bad signature")]
    BadSignature,
    #[error("wrong issuer")]
    WrongIssuer,
    #[error("wrong audience")]
    WrongAudience,
    #[error("expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => TokenError::BadSignature,
            ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
            ErrorKind::InvalidAudience => TokenError::WrongAudience,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// The claims carried on the wire.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    /// Subject of the token: the user's id, as a decimal string.
    sub: String,
    email: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    /// Unique per issuance, so two logins in the same second differ.
    jti: String,
}

/// Identity asserted by a token that passed every check in [`TokenService::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject_id: i32,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 JWTs bound to one issuer and audience.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Fails when the secret is shorter than [`crate::config::MIN_SECRET_BYTES`].
    pub fn new(settings: &JwtSettings) -> Result<Self, ConfigError> {
        settings.check_secret()?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            ttl: settings.ttl,
        })
    }

    /// Issues a token for `subject_id` valid for the configured TTL.
    pub fn issue(&self, subject_id: i32, email: &str) -> Result<IssuedToken, AppError> {
        self.issue_with_ttl(subject_id, email, self.ttl)
    }

    /// Issues a token expiring `ttl` after now. A zero or negative TTL yields a token
    /// that is already expired.
    pub fn issue_with_ttl(
        &self,
        subject_id: i32,
        email: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let issued_at = Utc::now();
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            AppError::InternalServerError("Token lifetime overflows the calendar".into())
        })?;

        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Checks signature, algorithm, issuer, audience and expiry, then parses the subject.
    /// A token is expired once the current time reaches `exp`.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let subject_id = claims.sub.parse::<i32>().map_err(|_| TokenError::Malformed)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        Ok(VerifiedClaims {
            subject_id,
            email: claims.email,
            expires_at,
        })
    }
}
