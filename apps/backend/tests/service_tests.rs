mod common;
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use bookshelf_test_support::error_body::assert_error_response;
use serde_json::Value;
use support::{create_test_app, test_state};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[actix_web::test]
async fn health_is_public() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Book Management API is running!");
    OffsetDateTime::parse(body["timestamp"].as_str().unwrap(), &Rfc3339)?;
    Ok(())
}

#[actix_web::test]
async fn unknown_route_is_404() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    let body = assert_error_response(resp, StatusCode::NOT_FOUND, "Route not found").await;
    assert_eq!(body.code, "ROUTE_NOT_FOUND");
    Ok(())
}

#[actix_web::test]
async fn error_trace_id_matches_request_id() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(test_state()).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/api/books").to_request();
    let resp = test::call_service(&app, req).await;
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-request-id header");
    let headers = resp.headers().clone();

    let body: Value = test::read_body_json(resp).await;
    common::assert_trace_id_matches(&body, &headers);
    assert_eq!(body["trace_id"], request_id.as_str());
    Ok(())
}
