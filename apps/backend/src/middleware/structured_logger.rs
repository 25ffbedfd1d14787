//! One `request_completed` line per request.
//!
//! Logs the matched route pattern next to the raw path, so book ids do not
//! fan out into distinct routes, and the caller's `user_id` when
//! `AuthGuard` resolved one. Level follows the status class.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::extractors::current_user::CurrentUser;
use crate::middleware::trace_span::route_label;

/// `user_id` value for requests that never authenticated.
pub const ANONYMOUS: &str = "anonymous";

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let route = route_label(&req);

        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            // The guard writes CurrentUser into the shared request extensions.
            let (status, user_id) = match &result {
                Ok(res) => (
                    res.status(),
                    res.request()
                        .extensions()
                        .get::<CurrentUser>()
                        .map(|user| user.id.clone()),
                ),
                Err(err) => (err.as_response_error().status_code(), None),
            };
            let user_id = user_id.unwrap_or_else(|| ANONYMOUS.to_string());

            let duration_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
            let status_code = status.as_u16();

            if status.is_server_error() {
                error!(http.method = %method, http.route = %route, url.path = %path, http.status_code = status_code, duration_us, %user_id, %trace_id, "request_completed");
            } else if status.is_client_error() {
                warn!(http.method = %method, http.route = %route, url.path = %path, http.status_code = status_code, duration_us, %user_id, %trace_id, "request_completed");
            } else {
                info!(http.method = %method, http.route = %route, url.path = %path, http.status_code = status_code, duration_us, %user_id, %trace_id, "request_completed");
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use actix_web::http::header;
    use actix_web::{test, web, App, HttpResponse};
    use bookshelf_test_support::logging::LogCapture;
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::jwt::mint_access_token;
    use crate::middleware::auth_guard::AuthGuard;
    use crate::repos::users::{self, User};
    use crate::state::app_state::AppState;
    use crate::state::security_config::SecurityConfig;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    async fn state_with_user() -> AppState {
        let state = AppState::in_memory(SecurityConfig::new("structured-logger-test-secret"));
        users::insert_user(
            state.store(),
            User {
                id: "u1".into(),
                email: "reader@x.com".into(),
                password_hash: "unused".into(),
                created_at: OffsetDateTime::now_utc(),
            },
        )
        .await
        .unwrap();
        state
    }

    #[actix_web::test]
    async fn completion_line_carries_route_and_user() {
        let state = state_with_user().await;
        let token = mint_access_token("u1", SystemTime::now(), &state.security).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .app_data(web::Data::new(state))
                .service(
                    web::scope("/api/books")
                        .wrap(AuthGuard)
                        .route("/{id}", web::get().to(ok)),
                ),
        )
        .await;

        let logs = LogCapture::start();
        let req = test::TestRequest::get()
            .uri("/api/books/b-42")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);

        let line = logs.find("request_completed").unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["http.route"], "/api/books/{id}");
        assert_eq!(line["fields"]["url.path"], "/api/books/b-42");
        assert_eq!(line["fields"]["http.status_code"], 200);
        assert_eq!(line["fields"]["user_id"], "u1");
    }

    #[actix_web::test]
    async fn rejected_request_is_logged_as_anonymous_warning() {
        let state = state_with_user().await;
        let app = test::init_service(
            App::new()
                .wrap(StructuredLogger)
                .app_data(web::Data::new(state))
                .service(
                    web::scope("/api/books")
                        .wrap(AuthGuard)
                        .route("/{id}", web::get().to(ok)),
                ),
        )
        .await;

        let logs = LogCapture::start();
        let req = test::TestRequest::get().uri("/api/books/b-42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);

        let line = logs.find("request_completed").unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["http.status_code"], 401);
        assert_eq!(line["fields"]["user_id"], ANONYMOUS);
    }
}
