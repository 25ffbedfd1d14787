use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use bookshelf::config::AppConfig;
use bookshelf::middleware::cors::cors_middleware;
use bookshelf::middleware::request_trace::RequestTrace;
use bookshelf::middleware::structured_logger::StructuredLogger;
use bookshelf::middleware::trace_span::TraceSpan;
use bookshelf::routes;
use bookshelf::state::app_state::AppState;
use bookshelf::store::JsonFileStore;
use bookshelf::telemetry;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Environment variables must be set by the runtime environment:
    // - Docker: docker-compose env_file or docker run --env-file
    // - Local dev: source an env file manually (e.g., set -a; . ./.env; set +a)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    telemetry::init_tracing(config.log_format);

    let store = JsonFileStore::new(config.data_dir.clone());
    let app_state = AppState::new(Arc::new(store), config.security.clone());

    info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "Starting bookshelf backend"
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);
    let origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            // Outermost, so tracing and routing both see `/api/books` for `/api/books/`.
            .wrap(NormalizePath::trim())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
