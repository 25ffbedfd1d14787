//! Registration and login.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::jwt::mint_access_token;
use crate::auth::password;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::repos::users::{self, PublicUser, User};
use crate::state::app_state::AppState;
use crate::store::Collection;

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid email or password";

/// Register/login request body. Both fields are optional at the wire level
/// so that absence is reported as a validation error, not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// Both fields present and non-empty, or `Email and password are required`.
    fn require(self) -> Result<(String, String), DomainError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(DomainError::validation(
                ValidationKind::MissingCredentials,
                "Email and password are required",
            )),
        }
    }
}

/// Token plus the public view of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Create a user and sign them in.
///
/// Order of checks: missing fields, password length, duplicate email.
pub async fn register(state: &AppState, credentials: Credentials) -> Result<AuthResponse, AppError> {
    let (email, password) = credentials.require()?;
    // Rejects short passwords before the duplicate check runs.
    let password_hash = run_blocking(move || password::hash_password(&password)).await??;

    let user = {
        let _guard = state.locks.acquire(Collection::Users).await;

        if users::find_user_by_email(state.store(), &email)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::UniqueEmail,
                "User already exists with this email",
            )
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users::insert_user(state.store(), user).await?
    };

    info!(user_id = %user.id, email = %Redacted(&user.email), "User registered");
    issue(state, &user)
}

/// Authenticate by email/password. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(state: &AppState, credentials: Credentials) -> Result<AuthResponse, AppError> {
    let (email, password) = credentials.require()?;

    let user = users::find_user_by_email(state.store(), &email).await?;

    let verified = match &user {
        Some(user) => {
            let hash = user.password_hash.clone();
            run_blocking(move || password::verify_password(&password, &hash)).await?
        }
        None => run_blocking(move || password::verify_against_dummy(&password)).await?,
    };

    match user {
        Some(user) if verified => issue(state, &user),
        Some(_) => {
            security::login_failed("wrong_password", &email);
            Err(DomainError::unauthenticated(INVALID_LOGIN_MESSAGE).into())
        }
        None => {
            security::login_failed("unknown_email", &email);
            Err(DomainError::unauthenticated(INVALID_LOGIN_MESSAGE).into())
        }
    }
}

fn issue(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = mint_access_token(&user.id, SystemTime::now(), &state.security)?;
    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}

/// Hashing is deliberately slow; keep it off the async workers.
async fn run_blocking<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("blocking task failed: {e}")))
}
