// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::{error, info};

use feed_be::AppState;
use feed_be::config::{self, AppConfig};
use feed_be::handlers;
use feed_be::middleware::TokenVerifier;
use feed_be::repositories::{MemoryStore, PgStore};
use feed_be::services::notifier::{DEFAULT_CAPACITY, socket_transport};
use feed_be::services::{DiskImageStorage, ImageStorage, Notifier};

async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let images: Arc<dyn ImageStorage> = Arc::new(DiskImageStorage::new(&cfg.image_dir));
    let notifier = Arc::new(Notifier::new());
    let tokens = TokenVerifier::new(cfg.jwt_secret.clone());

    let state = match &cfg.pg {
        Some(pg) => {
            let store = PgStore::new(config::get_pg_pool(pg)?);
            store
                .ensure_schema()
                .await
                .context("failed to prepare postgres schema")?;
            info!("Using postgres store at {}/{}", pg.host, pg.dbname);
            AppState::new(Arc::new(store), images, notifier, tokens, cfg.posts_per_page, cfg.max_image_bytes)
        }
        None => {
            info!("PG_HOST not set, using in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), images, notifier, tokens, cfg.posts_per_page, cfg.max_image_bytes)
        }
    };
    Ok(state)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let state = match build_state(&cfg).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialise storage: {:#}", e);
            std::process::exit(1);
        }
    };
    let notifier = state.notifier.clone();
    let state = web::Data::new(state);

    let allowed_origins = cfg.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", cfg.port);
    info!("Starting server on {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type"])
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?;

    // listener is bound; the socket channel must exist before the first request
    if let Err(e) = notifier.initialize(socket_transport(DEFAULT_CAPACITY)) {
        error!("Failed to initialise socket channel: {}", e);
        std::process::exit(1);
    }
    info!("Socket channel ready");

    server.run().await
}
