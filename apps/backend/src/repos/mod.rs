//! Typed repositories over the record store.

pub mod books;
pub mod users;
