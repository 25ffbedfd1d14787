//! User repository functions over the record store.
//!
//! Writers must hold `Collection::Users` from `CollectionLocks`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::domain::DomainError;
use crate::store::{self, Collection, RecordStore};

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// User as shown to API clients; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

pub async fn list_users(store: &dyn RecordStore) -> Result<Vec<User>, DomainError> {
    Ok(store::read_all(store, Collection::Users).await?)
}

pub async fn find_user_by_id(
    store: &dyn RecordStore,
    user_id: &str,
) -> Result<Option<User>, DomainError> {
    let users = list_users(store).await?;
    Ok(users.into_iter().find(|u| u.id == user_id))
}

/// Exact, case-sensitive email match.
pub async fn find_user_by_email(
    store: &dyn RecordStore,
    email: &str,
) -> Result<Option<User>, DomainError> {
    let users = list_users(store).await?;
    Ok(users.into_iter().find(|u| u.email == email))
}

/// Append `user` to the collection. Uniqueness is the caller's job.
pub async fn insert_user(store: &dyn RecordStore, user: User) -> Result<User, DomainError> {
    let mut users = list_users(store).await?;
    users.push(user.clone());
    store::write_all(store, Collection::Users, &users).await?;
    Ok(user)
}
