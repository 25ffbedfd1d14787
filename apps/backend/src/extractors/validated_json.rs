use std::ops::{Deref, DerefMut};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Request bodies above this size are refused before parsing.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON body extractor whose failures use the API's error shape.
///
/// Malformed or mistyped bodies become a 400 with a sanitized message;
/// the raw parser error only reaches the debug log, redacted.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(_req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();

        Box::pin(async move {
            let trace_id = trace_ctx::trace_id();

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    warn!(trace_id = %trace_id, error = %e, "Failed to read request body chunk");
                    AppError::bad_request(ErrorCode::BadRequest, "Failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        "Request body too large",
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            // An empty body reads as `{}` so field validation reports what is missing.
            let input: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
                b"{}"
            } else {
                &body
            };

            let parsed = serde_json::from_slice::<T>(input).map_err(|e| {
                debug!(
                    trace_id = %trace_id,
                    error = %Redacted(&e.to_string()),
                    body_size = body.len(),
                    "JSON parsing failed"
                );
                AppError::bad_request(ErrorCode::BadRequest, classify_json_error(&e))
            })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Classify serde_json::Error and return a sanitized error message
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("Invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Login {
        email: Option<String>,
    }

    #[test]
    fn test_classify_json_error_syntax() {
        let error = serde_json::from_str::<Login>(r#"{"email": }"#).unwrap_err();
        assert!(classify_json_error(&error).starts_with("Invalid JSON at line"));
    }

    #[test]
    fn test_classify_json_error_eof() {
        let error = serde_json::from_str::<Login>(r#"{"email": "a""#).unwrap_err();
        assert!(classify_json_error(&error).contains("unexpected end of input"));
    }

    #[test]
    fn test_classify_json_error_data() {
        let error = serde_json::from_str::<Login>(r#"{"email": 42}"#).unwrap_err();
        assert!(classify_json_error(&error).contains("wrong types"));
    }

    #[actix_web::test]
    async fn test_extracts_valid_body() {
        let (req, mut payload) = TestRequest::post()
            .set_payload(r#"{"email":"a@x.com"}"#)
            .to_http_parts();

        let ValidatedJson(login) = ValidatedJson::<Login>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(login.email.as_deref(), Some("a@x.com"));
    }

    #[actix_web::test]
    async fn test_empty_body_reads_as_empty_object() {
        let (req, mut payload) = TestRequest::post().to_http_parts();

        let ValidatedJson(login) = ValidatedJson::<Login>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert!(login.email.is_none());
    }

    #[actix_web::test]
    async fn test_malformed_body_is_400() {
        let (req, mut payload) = TestRequest::post()
            .set_payload("{not json")
            .to_http_parts();

        let err = ValidatedJson::<Login>::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }
}
