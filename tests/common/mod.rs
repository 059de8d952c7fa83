#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, App};
use serde_json::{json, Value};
use tasklist::store::MemoryStore;
use tasklist::{AppState, Config};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", TEST_SECRET),
        ("JWT_TTL_MINUTES", "30"),
        ("BCRYPT_COST", "4"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("test config")
}

/// App state over a fresh in-memory store; the store is returned for direct inspection.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(&test_config(), store.clone(), store.clone()).expect("app state");
    (state, store)
}

pub async fn init_app(
    state: &AppState,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let state = state.clone();
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg)),
    )
    .await
}

/// Sends a request and returns the status and the parsed JSON body (`Value::Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (actix_web::http::StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!("non-JSON body ({}): {:?}", e, String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn signup(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    name: &str,
    password: &str,
) -> (actix_web::http::StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": email, "name": name, "password": password }));
    send(app, req).await
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> (actix_web::http::StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }));
    send(app, req).await
}

/// Signs up and logs in, returning the user id and token.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    name: &str,
    password: &str,
) -> (i32, String) {
    let (status, body) = signup(app, email, name, password).await;
    assert!(status.is_success(), "signup failed: {} {}", status, body);

    let (status, body) = login(app, email, password).await;
    assert!(status.is_success(), "login failed: {} {}", status, body);

    let id = body["user_id"].as_i64().expect("user_id") as i32;
    let token = body["token"].as_str().expect("token").to_string();
    (id, token)
}
