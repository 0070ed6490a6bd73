//! Error type for the info and metrics handlers
//!
//! Every variant is an internal error: it is logged and returned to the
//! client as HTTP 500 with `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Result alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Failed to sample host resources: {0}")]
    Sampling(String),

    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metrics exposition is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl ServiceError {
    /// Short name used as a structured log field
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::Sampling(_) => "sampling_error",
            ServiceError::Serialization(_) => "serialization_error",
            ServiceError::Metrics(_) => "metrics_error",
            ServiceError::Encoding(_) => "encoding_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!(error_type = self.error_type(), error = %message, "Request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_maps_to_500_with_message() {
        let response = ServiceError::Sampling("cpu unavailable".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            json["error"],
            "Failed to sample host resources: cpu unavailable"
        );
    }

    #[test]
    fn test_error_type_names() {
        assert_eq!(
            ServiceError::Sampling(String::new()).error_type(),
            "sampling_error"
        );
        let err: ServiceError = prometheus::Error::Msg("dup".to_string()).into();
        assert_eq!(err.error_type(), "metrics_error");
    }
}
