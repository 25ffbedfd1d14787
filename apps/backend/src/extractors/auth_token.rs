use actix_web::dev::Payload;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::AppError;

/// Bearer credential taken from the `Authorization` header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
}

impl AuthToken {
    /// Take the second space-separated segment of the header as the token.
    ///
    /// The scheme is not checked: `Basic abc` yields `abc`, which then fails
    /// verification. Only an absent header or an empty second segment is
    /// treated as no token.
    pub fn from_header(value: Option<&HeaderValue>) -> Option<Self> {
        let raw = value?.to_str().ok()?;
        let token = raw.split(' ').nth(1).filter(|t| !t.is_empty())?;

        Some(AuthToken {
            token: token.to_string(),
        })
    }

    pub fn from_req(req: &HttpRequest) -> Option<Self> {
        Self::from_header(req.headers().get(header::AUTHORIZATION))
    }
}

impl FromRequest for AuthToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_req(req).ok_or_else(AppError::missing_bearer))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn parse(value: &str) -> Option<String> {
        AuthToken::from_header(Some(&HeaderValue::from_str(value).unwrap())).map(|t| t.token)
    }

    #[test]
    fn second_segment_is_the_token() {
        assert_eq!(parse("Bearer abc.def.ghi").as_deref(), Some("abc.def.ghi"));
        assert_eq!(parse("bearer xyz").as_deref(), Some("xyz"));
        // Scheme is not inspected; these go on to fail verification.
        assert_eq!(parse("Basic dXNlcjpwYXNz").as_deref(), Some("dXNlcjpwYXNz"));
        assert_eq!(parse("Token xyz").as_deref(), Some("xyz"));
        assert_eq!(parse("Bearer a b").as_deref(), Some("a"));
    }

    #[test]
    fn no_second_segment_is_no_token() {
        assert_eq!(parse("Bearer"), None);
        assert_eq!(parse("Bearer "), None);
        assert_eq!(parse("Bearer  xyz"), None);
        assert_eq!(parse("abc.def.ghi"), None);
        assert_eq!(AuthToken::from_header(None), None);
    }

    #[actix_web::test]
    async fn extractor_returns_401_without_header() {
        let req = TestRequest::default().to_http_request();
        let err = AuthToken::extract(&req).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 401);
        assert_eq!(err.public_message(), "Access token required");
    }
}
