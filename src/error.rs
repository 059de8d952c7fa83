//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type handlers and services return.
//! It implements `actix_web::error::ResponseError` so that every failure becomes a JSON
//! body of the shape `{"error": <kind>, "message": <text>}`, where `kind` is one of a
//! small set of stable strings clients can match on.
//!
//! Database and internal failures are logged with full detail and answered with a fixed
//! message; nothing from a driver or a cryptographic primitive reaches the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body could not be parsed (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Input parsed but failed field validation (HTTP 422).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// Signup with an email that is already registered (HTTP 409).
    #[error("Email already registered")]
    DuplicateEmail,
    /// Unknown email or wrong password; the two are deliberately indistinguishable (HTTP 401).
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Missing, invalid or expired bearer token (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The resource does not exist or belongs to someone else (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Wraps errors from `sqlx` other than `RowNotFound` (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Stable, client-visible error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => "invalid-input",
            AppError::DuplicateEmail => "duplicate-email",
            AppError::InvalidCredentials => "invalid-credentials",
            AppError::Unauthorized(_) => "unauthenticated",
            AppError::NotFound(_) => "not-found",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::DuplicateEmail | AppError::InvalidCredentials => self.to_string(),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.client_message(),
        }))
    }
}

/// `RowNotFound` becomes `NotFound`; every other database failure is internal.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// The verification reason is dropped here; callers log it before converting.
impl From<TokenError> for AppError {
    fn from(_: TokenError) -> AppError {
        AppError::Unauthorized("Invalid or expired token".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_responses() {
        let cases = [
            (AppError::Unauthorized("Invalid token".into()), 401),
            (AppError::InvalidCredentials, 401),
            (AppError::BadRequest("Invalid input".into()), 400),
            (AppError::ValidationError("email".into()), 422),
            (AppError::DuplicateEmail, 409),
            (AppError::NotFound("Resource not found".into()), 404),
            (AppError::InternalServerError("Server error".into()), 500),
            (AppError::DatabaseError("pool timed out".into()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{:?}", error);
        }
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_not_exposed() {
        let error = AppError::DatabaseError("relation \"users\" does not exist".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "internal");
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[actix_rt::test]
    async fn test_token_errors_hide_reason() {
        let error: AppError = TokenError::BadSignature.into();
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "unauthenticated");
        assert_eq!(json["message"], "Invalid or expired token");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.kind(), "not-found");
    }
}
