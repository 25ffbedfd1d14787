//! Single-owner mutation policy.

use crate::errors::domain::DomainError;
use crate::extractors::current_user::CurrentUser;

/// A record that belongs to exactly one user.
pub trait Owned {
    /// Plural noun used in denial messages, e.g. `"books"`.
    const KIND_PLURAL: &'static str;

    fn owner_id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    pub const fn verb(&self) -> &'static str {
        match self {
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

/// True iff `identity` owns `resource`.
pub fn can_mutate<R: Owned>(identity: &CurrentUser, resource: &R) -> bool {
    resource.owner_id() == identity.id
}

/// [`can_mutate`] as a guard: `Forbidden("You can only {verb} your own {kind}")`.
pub fn ensure_can_mutate<R: Owned>(
    identity: &CurrentUser,
    resource: &R,
    mutation: Mutation,
) -> Result<(), DomainError> {
    if can_mutate(identity, resource) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "You can only {} your own {}",
            mutation.verb(),
            R::KIND_PLURAL
        )))
    }
}
