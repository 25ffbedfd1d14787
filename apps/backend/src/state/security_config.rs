use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::AppError;

/// Access tokens live for a day unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Lifetime of minted access tokens
    pub token_ttl: Duration,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Like [`SecurityConfig::new`] but rejects an empty secret.
    pub fn try_new(jwt_secret: impl Into<Vec<u8>>) -> Result<Self, AppError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.is_empty() {
            return Err(AppError::config("JWT secret must not be empty"));
        }
        Ok(Self::new(jwt_secret))
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_a_config_error() {
        let err = SecurityConfig::try_new(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[test]
    fn defaults_to_hs256_and_one_day() {
        let cfg = SecurityConfig::try_new("s3cret").unwrap();
        assert_eq!(cfg.algorithm, Algorithm::HS256);
        assert_eq!(cfg.token_ttl, DEFAULT_TOKEN_TTL);

        let short = cfg.with_token_ttl(Duration::from_secs(60));
        assert_eq!(short.token_ttl.as_secs(), 60);
    }
}
