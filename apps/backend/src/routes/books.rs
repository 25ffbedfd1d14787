use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::validated_json::ValidatedJson;
use crate::services::books::{self, BookInput, ListQuery};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn list_books(
    query: web::Query<ListQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = books::list_books(&app_state, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

async fn search_books(
    query: web::Query<SearchQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let result = books::search_books(&app_state, query.genre.as_deref()).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn get_book(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let book = books::get_book(&app_state, &path).await?;
    Ok(HttpResponse::Ok().json(book))
}

async fn create_book(
    user: CurrentUser,
    body: ValidatedJson<BookInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let book = books::create_book(&app_state, &user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(book))
}

async fn update_book(
    user: CurrentUser,
    path: web::Path<String>,
    body: ValidatedJson<BookInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let book = books::update_book(&app_state, &user, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(book))
}

async fn delete_book(
    user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    books::delete_book(&app_state, &user, &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Book deleted successfully",
    }))
}

/// Query strings that fail to deserialize get the API error shape too.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::bad_request(crate::errors::ErrorCode::BadRequest, err.to_string()).into()
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .service(
            web::resource("")
                .route(web::get().to(list_books))
                .route(web::post().to(create_book)),
        )
        // Registered before /{id} so "search" is not taken as an id.
        .service(web::resource("/search").route(web::get().to(search_books)))
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_book))
                .route(web::put().to(update_book))
                .route(web::delete().to(delete_book)),
        );
}
