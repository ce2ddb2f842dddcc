//! registration-service: user registration over HTTP, backed by MongoDB.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

pub use startup::{router, AppState, Application};
