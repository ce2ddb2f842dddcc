//! User model - the only persisted entity.

use mongodb::bson::{oid::ObjectId, Bson, DateTime};
use serde::{Deserialize, Serialize};

/// A registered account as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned by the store on insert.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Stored as received; not restricted to strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Bson>,
    pub email: String,
    /// Argon2id PHC string, never the plaintext.
    pub password: String,
    pub created_at: DateTime,
}

impl User {
    pub fn new(name: Option<Bson>, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            name,
            email,
            password: password_hash,
            created_at: DateTime::now(),
        }
    }
}
