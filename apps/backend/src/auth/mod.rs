pub mod jwt;
pub mod ownership;
pub mod password;

pub use jwt::{mint_access_token, verify_access_token, Claims};
pub use ownership::{can_mutate, ensure_can_mutate, Mutation, Owned};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};
