use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::middleware::auth_guard::AuthGuard;

pub mod auth;
pub mod books;
pub mod health;

/// Register every API route. `main.rs` and the integration tests share
/// this, so tests exercise the same guard and scopes as production.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /api/health
    cfg.service(web::scope("/api/health").configure(health::configure_routes));

    // Auth routes: /api/auth/**
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));

    // Books routes: /api/books/**, bearer token required
    cfg.service(
        web::scope("/api/books")
            .wrap(AuthGuard)
            .configure(books::configure_routes),
    );

    cfg.default_service(web::to(route_not_found));
}

async fn route_not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::route_not_found())
}
