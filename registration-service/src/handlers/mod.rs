pub mod health;
pub mod register;

pub use health::health_check;
pub use register::register;

use service_core::error::AppError;

pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found";

/// Catch-all for unknown paths and unsupported methods on known ones.
pub async fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

/// Response for a handler that panicked. The panic itself reaches the
/// process-wide failure channel through the panic hook.
pub fn handle_panic(_payload: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    use axum::response::IntoResponse;

    AppError::InternalError(anyhow::anyhow!("request handler panicked")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn not_found_uses_failure_shape() {
        let err = not_found().await;
        assert_eq!(err.public_message(), NOT_FOUND_MESSAGE);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn panics_become_generic_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
