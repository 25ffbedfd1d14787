#![allow(dead_code)]

pub mod app_builder;
pub mod factory;

pub use app_builder::{create_test_app, test_state, TEST_SECRET};
pub use factory::{bearer, create_book, register_user, RegisteredUser};
