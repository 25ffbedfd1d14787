//! Error codes for the Bookshelf backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Bookshelf backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No bearer token was presented
    UnauthorizedMissingBearer,
    /// Token verified but its subject no longer resolves to a user
    UnauthorizedUnknownUser,
    /// Email/password pair did not match a user
    InvalidCredentials,
    /// Token signature invalid or payload malformed
    ForbiddenInvalidToken,
    /// Token signature valid but expired
    ForbiddenExpiredToken,
    /// Caller does not own the resource
    NotOwner,

    // Request Validation
    /// Email or password absent from the request
    MissingCredentials,
    /// Password shorter than the minimum length
    PasswordTooShort,
    /// Email already registered
    EmailTaken,
    /// One or more required book fields missing
    MissingBookFields,
    /// publishedYear is not a non-negative integer
    InvalidPublishedYear,
    /// Search request without a genre
    MissingGenre,
    /// Page or limit query parameter out of range
    InvalidPagination,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Book not found
    BookNotFound,
    /// No route matched the request
    RouteNotFound,

    // System Errors
    /// Record store failure
    StoreError,
    /// Stored data could not be decoded
    DataCorruption,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedUnknownUser => "UNAUTHORIZED_UNKNOWN_USER",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ForbiddenInvalidToken => "FORBIDDEN_INVALID_TOKEN",
            Self::ForbiddenExpiredToken => "FORBIDDEN_EXPIRED_TOKEN",
            Self::NotOwner => "NOT_OWNER",

            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::MissingBookFields => "MISSING_BOOK_FIELDS",
            Self::InvalidPublishedYear => "INVALID_PUBLISHED_YEAR",
            Self::MissingGenre => "MISSING_GENRE",
            Self::InvalidPagination => "INVALID_PAGINATION",
            Self::BadRequest => "BAD_REQUEST",

            Self::BookNotFound => "BOOK_NOT_FOUND",
            Self::RouteNotFound => "ROUTE_NOT_FOUND",

            Self::StoreError => "STORE_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
