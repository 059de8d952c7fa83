use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use lazy_static::lazy_static;
use log::{debug, error, warn};
use regex::Regex;

use crate::auth::token::{TokenService, VerifiedClaims};
use crate::error::AppError;

lazy_static! {
    // RFC 6750: the scheme is case-insensitive, the token is a single run of non-space characters.
    static ref BEARER_REGEX: Regex = Regex::new(r"^(?i:bearer)\s+(\S+)\s*$").unwrap();
}

/// Rejects requests without a valid bearer token and binds the verified claims
/// to the request for [`AuthenticatedUser`](crate::auth::AuthenticatedUser).
///
/// The `TokenService` is read from application data (`web::Data<TokenService>`).
/// Failures short-circuit with a 401 before the wrapped handler runs.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req.into_response(app_err.error_response()).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// Extracts the token from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    BEARER_REGEX
        .captures(header_value)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str())
}

fn authenticate(req: &ServiceRequest) -> Result<VerifiedClaims, AppError> {
    let tokens = req.app_data::<web::Data<TokenService>>().ok_or_else(|| {
        error!("TokenService missing from app data; protected route cannot authenticate");
        AppError::InternalServerError("token service not configured".into())
    })?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        debug!("{} {}: missing bearer token", req.method(), req.path());
        return Err(AppError::Unauthorized("Missing token".into()));
    };

    tokens.verify(token).map_err(|reason| {
        warn!("{} {}: rejected token ({})", req.method(), req.path(), reason);
        AppError::from(reason)
    })
}
