#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::http::header::HeaderMap;
use serde_json::Value;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    bookshelf_test_support::logging::init();
}

/// Trace id in the body must equal the `x-trace-id` header.
pub fn assert_trace_id_matches(json: &Value, headers: &HeaderMap) {
    let header = headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present");
    assert_eq!(json["trace_id"].as_str(), Some(header));
}
