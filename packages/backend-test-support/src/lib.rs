//! Shared helpers for the bookshelf backend tests.
//!
//! Kept free of backend types so both unit and integration tests can
//! depend on it without a cycle.

pub mod error_body;
pub mod logging;
pub mod unique_helpers;
