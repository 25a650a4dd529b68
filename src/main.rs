use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod store;
mod utils;

use attendance::AttendanceService;
use config::{Config, StoreBackend};
use db::init_db;
use store::AttendanceStore;
use store::memory::InMemoryAttendanceStore;
use store::mysql::MySqlAttendanceStore;
use utils::clock::SystemClock;

use crate::docs::ApiDoc;
use tracing::{info, warn};
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

    info!("Server starting...");

    let store: Arc<dyn AttendanceStore> = match (config.store_backend, &config.database_url) {
        (StoreBackend::Mysql, Some(url)) => {
            let pool = init_db(url)
                .await
                .context("Failed to connect to database")?;
            Arc::new(MySqlAttendanceStore::new(pool))
        }
        (StoreBackend::Mysql, None) => anyhow::bail!("DATABASE_URL must be set"),
        (StoreBackend::Memory, _) => {
            warn!("Using in-memory attendance store; records are lost on restart");
            Arc::new(InMemoryAttendanceStore::new())
        }
    };

    let service = AttendanceService::new(store, Arc::new(SystemClock), config.policy);

    info!(
        addr = %config.server_addr,
        store = %config.store_backend,
        utc_offset = %config.policy.zone,
        "Attendance service configured"
    );

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let route_config = config.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(service.clone()))
            .app_data(Data::new(config.clone()))
            // Configure protected routes with rate limiting
            .configure(move |cfg| routes::configure(cfg, &route_config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
