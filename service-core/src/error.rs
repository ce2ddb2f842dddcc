use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public message for every failure whose cause must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno no servidor";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    /// Server-side failure with a caller-facing message of its own.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

/// Body of every failure response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::OperationFailed(_)
            | AppError::InternalError(_)
            | AppError::DatabaseError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::OperationFailed(msg) => msg.clone(),
            AppError::PayloadTooLarge => "Payload too large".to_string(),
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::InternalError(err)
            | AppError::DatabaseError(err)
            | AppError::ConfigError(err) => {
                tracing::error!(error = ?err, "{}", self);
            }
            AppError::OperationFailed(_) => tracing::error!("{}", self),
            _ => tracing::debug!(status = %status, "{}", self),
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).expect("Failed to parse error body");
        (status, body)
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = body_of(AppError::Conflict("E-mail já cadastrado".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, ErrorResponse::new("E-mail já cadastrado"));
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let err = AppError::DatabaseError(anyhow::anyhow!("connection refused at 10.0.0.3:27017"));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert_eq!(body.error, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn operation_failures_use_their_own_message() {
        let (status, body) =
            body_of(AppError::OperationFailed("Erro ao registrar o usuário".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Erro ao registrar o usuário");
    }

    #[tokio::test]
    async fn payload_too_large_maps_to_413() {
        let (status, body) = body_of(AppError::PayloadTooLarge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.error, "Payload too large");
    }
}
