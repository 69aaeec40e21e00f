// Response helpers shared by every route

use crate::errors::MonitorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generic error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
}

pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message: message.to_string(),
                details: details.map(str::to_string),
                timestamp: Utc::now(),
                request_id: None,
            },
        }),
    )
        .into_response()
}

/// Map a monitor error to a status
///
/// `banner` is the operator-facing text; the raw error then goes to `details`.
pub fn monitor_error_response(err: &MonitorError, banner: Option<String>) -> Response {
    let (status, code) = match err {
        MonitorError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
        MonitorError::Network { .. } | MonitorError::HttpStatus { .. } | MonitorError::Decode { .. } => {
            (StatusCode::BAD_GATEWAY, "backend_unavailable")
        }
        MonitorError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failed"),
        MonitorError::Config(_) | MonitorError::Notification(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };

    let raw = err.to_string();
    match banner {
        Some(banner) if banner != raw => error_response(status, code, &banner, Some(&raw)),
        _ => error_response(status, code, &raw, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_raw_error_in_details() {
        let err = MonitorError::HttpStatus {
            endpoint: "POST /coldkeys".to_string(),
            status: 500,
            body: None,
        };
        let response = monitor_error_response(&err, Some("Failed to register coldkey.".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_of(response).await;
        assert_eq!(body["error"]["code"], "backend_unavailable");
        assert_eq!(body["error"]["message"], "Failed to register coldkey.");
        assert_eq!(body["error"]["details"], "HTTP 500 from POST /coldkeys: No body");
        assert!(body["error"]["request_id"].is_null());
    }

    #[tokio::test]
    async fn test_validation_message_is_not_repeated() {
        let err = MonitorError::Validation("Please enter a valid coldkey.".to_string());
        let response = monitor_error_response(&err, Some("Please enter a valid coldkey.".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body["error"]["message"], "Please enter a valid coldkey.");
        assert!(body["error"]["details"].is_null());
    }
}
