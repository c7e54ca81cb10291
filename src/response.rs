use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

/// Uniform JSON wrapper returned by every route.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            error: None,
        }
    }
}

/// Everything a handler can fail with; converted to an envelope at the
/// response boundary so the process never crashes on a request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Missing, malformed or expired token.
    #[error("You are not allowed to perform this action")]
    Unauthorized,
    /// Valid token, wrong role.
    #[error("You are not allowed to perform this action")]
    Forbidden,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        const GATE_MESSAGE: &str = "You are not allowed to perform this action";

        let (status, envelope) = match self {
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                Envelope::fail(format!("{name} not found"), json!([])),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Envelope::fail("Invalid credentials", Value::Null),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Envelope::fail(GATE_MESSAGE, Value::Null),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Envelope::fail(GATE_MESSAGE, Value::Null),
            ),
            ApiError::Database(e) => {
                error!(error = %e, "store error");
                let message = e.to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope {
                        success: false,
                        message: message.clone(),
                        data: Value::Null,
                        error: Some(message),
                    },
                )
            }
            ApiError::Serialize(e) => {
                error!(error = %e, "response serialization failed");
                let message = e.to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope {
                        success: false,
                        message: message.clone(),
                        data: Value::Null,
                        error: Some(message),
                    },
                )
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                let message = e.to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope {
                        success: false,
                        message: message.clone(),
                        data: Value::Null,
                        error: Some(message),
                    },
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_skips_error_field_when_absent() {
        let envelope = Envelope::ok("User created successfully", json!({"id": 1}));
        let text = serde_json::to_string(&envelope).expect("serialize");
        assert!(text.contains("\"success\":true"));
        assert!(!text.contains("\"error\""));
    }

    #[test]
    fn envelope_keeps_error_field_when_present() {
        let envelope = Envelope {
            success: false,
            message: "duplicate key value".into(),
            data: Value::Null,
            error: Some("duplicate key value".into()),
        };
        let text = serde_json::to_string(&envelope).expect("serialize");
        assert!(text.contains("\"error\":\"duplicate key value\""));
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_empty_data() {
        let response = ApiError::NotFound("User").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("User not found"));
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn gate_rejections_use_the_fixed_message() {
        for (err, status) in [
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("read body");
            let body: Value = serde_json::from_slice(&bytes).expect("json body");
            assert_eq!(
                body["message"],
                json!("You are not allowed to perform this action")
            );
        }
    }
}
