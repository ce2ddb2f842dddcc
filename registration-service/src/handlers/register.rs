use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{dtos::RegisterRequest, startup::AppState, utils::JsonBody};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(request = ?req, "Registration request received");

    let res = state.registration.register(req).await?;

    Ok((StatusCode::CREATED, Json(res)))
}
