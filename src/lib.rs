#![doc = "The `tasklist` library crate."]
#![doc = ""]
#![doc = "Account signup and login with signed bearer tokens, and per-user task CRUD"]
#![doc = "where every task operation is scoped to the token's subject."]
#![doc = "The binary (`main.rs`) loads `Config`, connects the Postgres store and serves"]
#![doc = "the app built by `AppState::configure`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
