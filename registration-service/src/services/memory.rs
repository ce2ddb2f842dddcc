use crate::models::User;
use crate::services::store::{StoreError, UserStore};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Process-local [`UserStore`] with the same uniqueness rule as the unique
/// email index. Availability can be switched off to simulate an outage.
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    available: AtomicBool,
    omit_ids: AtomicBool,
    closed: AtomicBool,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            omit_ids: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes inserts succeed without reporting an identifier.
    pub fn set_omit_ids(&self, omit: bool) {
        self.omit_ids.store(omit, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    pub async fn count_by_email(&self, email: &str) -> usize {
        self.users
            .lock()
            .await
            .iter()
            .filter(|u| u.email == email)
            .count()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(StoreError::Connection("in-memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.ensure_available()?;
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, mut user: User) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let id = ObjectId::new();
        user.id = Some(id);
        users.push(user);

        if self.omit_ids.load(Ordering::SeqCst) {
            Ok(None)
        } else {
            Ok(Some(id.to_hex()))
        }
    }

    fn is_connected(&self) -> bool {
        self.available.load(Ordering::SeqCst) && !self.is_closed()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
