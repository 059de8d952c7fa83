use std::sync::Arc;

use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, HttpRequest,
};
use log::debug;

use crate::auth::{AuthService, PasswordHasher, TokenService};
use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::routes::{self, health};
use crate::store::{TaskStore, UserStore};

/// Everything the handlers need, built once at startup and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub tokens: web::Data<TokenService>,
    pub tasks: web::Data<dyn TaskStore>,
}

impl AppState {
    /// Fails on a weak signing key or an unusable bcrypt cost.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, ConfigError> {
        let tokens = Arc::new(TokenService::new(&config.jwt)?);
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let auth = AuthService::new(users, hasher, tokens.clone());

        Ok(Self {
            auth: web::Data::new(auth),
            tokens: web::Data::from(tokens),
            tasks: web::Data::from(tasks),
        })
    }

    /// Registers app data, `/health` and the `/api` scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tokens.clone())
            .app_data(self.tasks.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config));
    }
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("{} {}: unreadable JSON body: {}", req.method(), req.path(), err);
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("{} {}: bad query string: {}", req.method(), req.path(), err);
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

// An id that cannot name a resource is reported like any other missing one.
fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("{} {}: bad path segment: {}", req.method(), req.path(), err);
    AppError::NotFound("Task not found".into()).into()
}
