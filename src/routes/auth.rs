use crate::{
    auth::{AuthService, AuthenticatedUser, LoginRequest, SignupRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{id, email, name}` of the new account.
/// - `400 Bad Request`: The body is not valid JSON or misses a field.
/// - `409 Conflict`: The email is already registered.
/// - `422 Unprocessable Entity`: Invalid email, blank name or a password outside 6–72 characters.
#[post("/signup")]
pub async fn signup(
    auth: web::Data<AuthService>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let profile = auth.signup(signup_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{token, token_type, expires_at, user_id}`.
/// - `401 Unauthorized`: Unknown email or wrong password, with the same body either way.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Current user
///
/// Returns the profile of the token's subject. Takes no id from the client.
/// Mounted behind `AuthMiddleware`.
pub async fn me(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = auth.current_user(user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}
