//! Request-level errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors that end a request with a direct response.
///
/// Resolution failures are not here: they are absorbed by the interception
/// stage and never reach the client.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required routing variable is absent or empty.
    #[error("missing required variable ${variable}")]
    MissingContext { variable: String },

    /// Preparing the resolution inputs or the redirect target failed.
    #[error("failed to prepare request: {0}")]
    Allocation(String),

    /// Forwarding to the chosen upstream failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// No endpoint was picked and the location fails closed.
    #[error("no inference workload endpoint available")]
    NoEndpoint,

    #[error("not found")]
    NotFound,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingContext { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Allocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NoEndpoint => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::MissingContext { .. } => "MISSING_CONTEXT",
            GatewayError::Allocation(_) => "ALLOCATION_FAILURE",
            GatewayError::Upstream(_) => "UPSTREAM_ERROR",
            GatewayError::NoEndpoint => "NO_ENDPOINT",
            GatewayError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = GatewayError::MissingContext { variable: "epp_port".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "missing required variable $epp_port");
        assert_eq!(
            GatewayError::Allocation("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(GatewayError::NoEndpoint.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = GatewayError::Upstream("refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"]["status"], 502);
    }
}
