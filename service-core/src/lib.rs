//! service-core: Shared infrastructure for the registration workspace.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod shutdown;
