use crate::models::User;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Connection(String),

    #[error("Duplicate value for unique field '{0}'")]
    Duplicate(&'static str),

    #[error("Write failed: {0}")]
    Write(#[source] mongodb::error::Error),

    #[error("Query failed: {0}")]
    Query(#[source] mongodb::error::Error),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when no record has this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persists `user` and returns the generated identifier as a string, or
    /// `Ok(None)` when the store acknowledged the write without one.
    async fn insert(&self, user: User) -> Result<Option<String>, StoreError>;

    /// Current connectivity as last observed. Never blocks on the store.
    fn is_connected(&self) -> bool;

    /// Releases the connection. Safe to call more than once.
    async fn close(&self);
}
