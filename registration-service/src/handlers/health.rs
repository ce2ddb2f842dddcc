use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};

use crate::{dtos::HealthResponse, startup::AppState};

/// Always 200; `database` reflects the store's last observed connectivity.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.store.is_connected() {
        "Connected"
    } else {
        "Disconnected"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK".to_string(),
            message: "Server is running".to_string(),
            database: database.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}
