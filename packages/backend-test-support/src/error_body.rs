//! Assertions for the API's JSON error contract.

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Mirror of the backend error body, decoupled from backend types.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBodyLike {
    pub error: String,
    pub code: String,
    pub trace_id: String,
}

/// Assert that response parts conform to the error contract:
///
/// - status matches
/// - body is `{error, code, trace_id}` JSON
/// - `x-trace-id` header exists and equals the body's `trace_id`
/// - `error` is exactly `expected_message`
///
/// Returns the parsed body for further checks.
pub fn assert_error_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_status: StatusCode,
    expected_message: &str,
) -> ErrorBodyLike {
    assert_eq!(status, expected_status);

    let parsed: ErrorBodyLike = serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "response body should be error JSON ({e}): {}",
            String::from_utf8_lossy(body)
        )
    });

    let trace_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert_eq!(
        parsed.trace_id, trace_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(parsed.error, expected_message);
    parsed
}

/// [`assert_error_parts`] for a test `ServiceResponse`.
pub async fn assert_error_response<B>(
    resp: actix_web::dev::ServiceResponse<B>,
    expected_status: StatusCode,
    expected_message: &str,
) -> ErrorBodyLike
where
    B: actix_web::body::MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_error_parts(status, &headers, &body, expected_status, expected_message)
}
