use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;

mod api;
mod attendance;
mod auth;
mod backend;
mod config;
mod docs;
mod error;
mod live;
mod model;
mod models;
mod print;
mod routes;
mod utils;

use config::Config;

use crate::backend::BackendClient;
use crate::docs::ApiDoc;
use crate::live::LiveHub;
use crate::utils::history_cache::{self, HistoryCache};
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        addr = %config.server_addr,
        backend = %config.backend_url,
        live = %config.backend_ws_url,
        "Server starting..."
    );

    let backend = BackendClient::new(&config.backend_url, config.backend_timeout)?;
    let cache = HistoryCache::new(config.history_limit, config.history_cache_ttl);

    // Attendance feed traffic makes the cached history stale.
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let hub = LiveHub::start(&config.backend_ws_url, &config.live, events_tx);
    actix_web::rt::spawn(history_cache::invalidate_on_events(cache.clone(), events_rx));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let hub_data = hub.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(backend.clone()))
            .app_data(Data::new(cache.clone()))
            .app_data(Data::new(hub_data.clone()))
            // Protected routes with auth and rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    info!("Server stopped, closing live feeds");
    hub.shutdown();
    Ok(())
}
