use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// `"Connected"` or `"Disconnected"`.
    pub database: String,
    pub timestamp: String,
}
