//! Password hashing and verification (Argon2id, PHC strings).

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use once_cell::sync::Lazy;
use rand::RngCore;

use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

pub const MIN_PASSWORD_LEN: usize = 6;

const SALT_LEN: usize = 16;

/// Digest of a throwaway password, verified against when the account does
/// not exist so both login failure paths cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("dummy-password-never-matches").ok());

/// Whether `password` satisfies the minimum length.
pub fn meets_min_length(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    if !meets_min_length(password) {
        return Err(DomainError::validation(
            ValidationKind::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }

    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| DomainError::infra(InfraErrorKind::Other("salt".into()), e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| DomainError::infra(InfraErrorKind::Other("hash".into()), e.to_string()))
}

/// `true` only if `password` matches `hash`. A malformed hash is a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Spend one verification's worth of work; always `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
