use actix_web::error::ResponseError;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// Message returned to clients for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Message safe to show the client. Server errors never leak their detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Unauthorized { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Internal { .. } | AppError::Config { .. } => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// No bearer token on a protected route.
    pub fn missing_bearer() -> Self {
        Self::unauthorized(ErrorCode::UnauthorizedMissingBearer, "Access token required")
    }

    /// Token failed signature, format, or claim validation.
    pub fn invalid_token() -> Self {
        Self::forbidden(ErrorCode::ForbiddenInvalidToken, "Invalid token")
    }

    /// Token signature is fine but `exp` has passed.
    pub fn expired_token() -> Self {
        Self::forbidden(ErrorCode::ForbiddenExpiredToken, "Invalid token")
    }

    /// Token verified but its subject does not resolve to a user.
    pub fn unknown_token_subject() -> Self {
        Self::unauthorized(ErrorCode::UnauthorizedUnknownUser, "Invalid token")
    }

    pub fn route_not_found() -> Self {
        Self::not_found(ErrorCode::RouteNotFound, "Route not found")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::MissingCredentials => ErrorCode::MissingCredentials,
                    ValidationKind::PasswordTooShort => ErrorCode::PasswordTooShort,
                    ValidationKind::MissingBookFields => ErrorCode::MissingBookFields,
                    ValidationKind::InvalidPublishedYear => ErrorCode::InvalidPublishedYear,
                    ValidationKind::MissingGenre => ErrorCode::MissingGenre,
                    ValidationKind::InvalidPagination => ErrorCode::InvalidPagination,
                };
                AppError::invalid(code, detail)
            }
            DomainError::Unauthenticated(detail) => {
                AppError::unauthorized(ErrorCode::InvalidCredentials, detail)
            }
            DomainError::Forbidden(detail) => AppError::forbidden(ErrorCode::NotOwner, detail),
            // Duplicate registration keeps the 400 the API has always returned.
            DomainError::Conflict(ConflictKind::UniqueEmail, detail) => {
                AppError::invalid(ErrorCode::EmailTaken, detail)
            }
            DomainError::NotFound(NotFoundKind::Book, detail) => {
                AppError::not_found(ErrorCode::BookNotFound, detail)
            }
            DomainError::Infra(kind, detail) => {
                let code = match kind {
                    InfraErrorKind::DataCorruption => ErrorCode::DataCorruption,
                    InfraErrorKind::StoreIo => ErrorCode::StoreError,
                    InfraErrorKind::Other(_) => ErrorCode::Internal,
                };
                AppError::Internal { code, detail }
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        if status.is_server_error() {
            error!(trace_id = %trace_id, code = %code, error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.public_message(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder.insert_header((trace_ctx::TRACE_HEADER, trace_id));
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(body)
    }
}
