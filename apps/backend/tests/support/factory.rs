//! Request helpers that drive the real endpoints.

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, Error};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// `("Authorization", "Bearer <token>")`
pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Register through `POST /api/auth/register`, asserting 201.
pub async fn register_user<S>(app: &S, email: &str, password: &str) -> RegisteredUser
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 201, "registration of {email} failed");

    let body: Value = test::read_body_json(resp).await;
    RegisteredUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        email: body["user"]["email"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

/// Create through `POST /api/books`, asserting 201; returns the book JSON.
pub async fn create_book<S>(app: &S, token: &str, title: &str, genre: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": title,
            "author": "Test Author",
            "genre": genre,
            "publishedYear": 2020
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 201, "creating {title} failed");
    test::read_body_json(resp).await
}
