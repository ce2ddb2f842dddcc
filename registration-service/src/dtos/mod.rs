pub mod health;
pub mod register;

pub use health::HealthResponse;
pub use register::{RegisterRequest, RegisterResponse};
