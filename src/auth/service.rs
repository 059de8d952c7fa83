use std::sync::Arc;

use actix_web::web;
use log::{debug, info};
use validator::Validate;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::auth::{normalize_email, AuthResponse, LoginRequest, SignupRequest};
use crate::error::AppError;
use crate::models::{NewUser, UserProfile};
use crate::store::UserStore;

/// Signup, login and current-user lookup over a [`UserStore`].
///
/// bcrypt work is moved to the blocking pool so no executor thread and no lock is
/// held while hashing.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates an account.
    ///
    /// Input is validated before the store is touched; a taken email yields
    /// `AppError::DuplicateEmail`. The returned profile never includes the hash.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserProfile, AppError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        if self.users.find_by_email(&email).await?.is_some() {
            debug!("signup rejected: email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let hasher = self.hasher.clone();
        let password = request.password;
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        let user = self
            .users
            .insert(NewUser {
                email,
                name: request.name.trim().to_string(),
                password_hash,
            })
            .await?;

        info!("registered user {}", user.id);
        Ok(user.profile())
    }

    /// Exchanges credentials for a token.
    ///
    /// Unknown email and wrong password both return `AppError::InvalidCredentials`,
    /// after comparable bcrypt work.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);
        let user = self.users.find_by_email(&email).await?;

        let hasher = self.hasher.clone();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password = request.password;
        let matched = run_blocking(move || match stored_hash {
            Some(stored_hash) => hasher.verify(&stored_hash, &password),
            None => hasher.verify_dummy(&password),
        })
        .await?;

        let user = match user {
            Some(user) if matched => user,
            _ => {
                debug!("login rejected: invalid credentials");
                return Err(AppError::InvalidCredentials);
            }
        };

        let issued = self.tokens.issue(user.id, &user.email)?;
        info!("user {} logged in", user.id);

        Ok(AuthResponse {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user_id: user.id,
        })
    }

    /// Profile of the authenticated principal. The id must come from verified claims.
    pub async fn current_user(&self, user_id: i32) -> Result<UserProfile, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

async fn run_blocking<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("blocking task failed: {}", e)))
}
