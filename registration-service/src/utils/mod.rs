pub mod json;
pub mod password;

pub use json::JsonBody;
pub use password::{hash_password, verify_password, Password, PasswordHashString};
