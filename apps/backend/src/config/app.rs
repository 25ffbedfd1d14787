//! Process configuration read from the environment at startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::middleware::cors::parse_allowed_origins;
use crate::state::security_config::{SecurityConfig, DEFAULT_TOKEN_TTL};
use crate::telemetry::LogFormat;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `users.json` and `books.json`
    pub data_dir: PathBuf,
    pub security: SecurityConfig,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Build from `BACKEND_*` / `CORS_ALLOWED_ORIGINS`. Only the JWT secret
    /// is required; malformed numbers are errors rather than defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = must_var("BACKEND_JWT_SECRET")?;
        let token_ttl = parse_var::<u64>("BACKEND_JWT_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        if token_ttl.is_zero() {
            return Err(AppError::config("BACKEND_JWT_TTL_SECS must be greater than zero"));
        }

        let security = SecurityConfig::try_new(jwt_secret.into_bytes())?.with_token_ttl(token_ttl);

        Ok(Self {
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_var("BACKEND_PORT")?.unwrap_or(DEFAULT_PORT),
            data_dir: env::var("BACKEND_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            security,
            cors_allowed_origins: parse_allowed_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            log_format: match env::var("BACKEND_LOG_FORMAT") {
                Ok(raw) => raw.parse()?,
                Err(_) => LogFormat::default(),
            },
        })
    }
}

/// Get required, non-empty environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(AppError::config(format!("{name} must not be empty"))),
        Err(_) => Err(AppError::config(format!("{name} must be set"))),
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::config(format!("{name} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}
