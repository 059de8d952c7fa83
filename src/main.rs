use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use tasklist::store::PgStore;
use tasklist::{AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = PgStore::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| {
            error!("failed to connect to database: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;
    store.ensure_schema().await.map_err(|e| {
        error!("failed to prepare database schema: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let store = Arc::new(store);
    let state = AppState::new(&config, store.clone(), store).map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    info!(
        "Starting tasklist server at {} (issuer {}, token ttl {} min, bcrypt cost {})",
        config.server_url(),
        config.jwt.issuer,
        config.jwt.ttl.num_minutes(),
        config.bcrypt_cost
    );

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
