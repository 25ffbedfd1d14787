use actix_web::{web, HttpResponse, Result};

use crate::error::AppError;
use crate::extractors::validated_json::ValidatedJson;
use crate::services::users::{self, Credentials};
use crate::state::app_state::AppState;

/// POST /api/auth/register
async fn register(
    body: ValidatedJson<Credentials>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let response = users::register(&app_state, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/auth/login
async fn login(
    body: ValidatedJson<Credentials>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let response = users::login(&app_state, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login));
}
