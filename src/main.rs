use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod services;
mod timeline;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::services::face_verify::FaceVerifyClient;
use crate::services::openrouter::ChatClient;
use crate::services::storage::MediaStore;
use crate::utils::username_lookup;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "AttendEase API"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
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

    let pool = init_db(&config.database_url).await;

    let media_store = MediaStore::new(&config.media_root, &config.media_url);
    let face_client = FaceVerifyClient::new(&config.face_verify_url);
    let chat_client = ChatClient::new(
        &config.openrouter_url,
        &config.openrouter_api_key,
        &config.openrouter_model,
    );

    // Warm the username filter/cache in the background; registration works
    // (slower) before this completes.
    let pool_for_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = username_lookup::warmup(&pool_for_warmup, 30, 250).await {
            eprintln!("Failed to warm up username lookup: {:?}", e);
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(media_store.clone()))
            .app_data(Data::new(face_client.clone()))
            .app_data(Data::new(chat_client.clone()))
            .service(index)
            // Face images under MEDIA_ROOT are served by the front proxy
            // at MEDIA_URL; the app only hands out URLs.
            // Auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
