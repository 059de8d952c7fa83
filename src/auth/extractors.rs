use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::VerifiedClaims;
use crate::error::AppError;

/// The authenticated principal of the current request.
///
/// Built from the [`VerifiedClaims`] that `AuthMiddleware` stores in the request
/// extensions. This is the only source of an owner id handlers may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<VerifiedClaims>() {
            Some(claims) => ready(Ok(AuthenticatedUser {
                id: claims.subject_id,
                email: claims.email.clone(),
            })),
            // Route is not behind AuthMiddleware; refuse rather than guess.
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
