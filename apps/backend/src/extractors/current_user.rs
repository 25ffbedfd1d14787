use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::users::User;

/// Authenticated caller, resolved from the bearer token by `AuthGuard` and
/// stored in the request extensions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // A handler outside the guard has no identity; treat as unauthenticated.
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(AppError::missing_bearer),
        )
    }
}
