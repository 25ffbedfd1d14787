//! Bearer-token guard for protected scopes.
//!
//! Resolves the caller before any handler runs and stores a
//! [`CurrentUser`] in the request extensions. Rejections:
//!
//! - no header, or no second segment after the scheme: 401
//! - token fails verification (signature, shape, expiry): 403
//! - token is valid but its user no longer exists: 401
//! - user lookup itself fails: 403 (logged)

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, error, Span};

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::extractors::auth_token::AuthToken;
use crate::extractors::current_user::CurrentUser;
use crate::logging::security;
use crate::repos::users;
use crate::state::app_state::AppState;

pub struct AuthGuard;

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGuardMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let outcome = authenticate(&req).await;
            match outcome {
                Ok(user) => {
                    Span::current().record("user_id", user.id.as_str());
                    debug!(user_id = %user.id, "Request authenticated");
                    // Store identity in request extensions BEFORE calling the service
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                // Rendered here so the response is built inside the request's trace scope.
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<CurrentUser, AppError> {
    let token = AuthToken::from_header(req.headers().get(header::AUTHORIZATION))
        .ok_or_else(AppError::missing_bearer)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    let claims = verify_access_token(&token.token, &state.security).inspect_err(|e| {
        security::token_rejected(e.code().as_str());
    })?;

    match users::find_user_by_id(state.store(), &claims.user_id).await {
        Ok(Some(user)) => Ok(CurrentUser::from(&user)),
        Ok(None) => {
            security::token_rejected("unknown_subject");
            Err(AppError::unknown_token_subject())
        }
        Err(e) => {
            error!(error = %e, user_id = %claims.user_id, "User lookup failed during authentication");
            Err(AppError::invalid_token())
        }
    }
}
