// Error response plumbing shared by every domain error type
// Each module owns its own error enum; they all render through this body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;

/// Consistent error response structure
///
/// Every error leaving the API uses this JSON shape so clients can branch on
/// `error_code` and show `message` as-is.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "NOT_PRICED", "EMPTY_CART")
    pub error_code: &'static str,

    /// Human-readable error message, safe to show to clients
    pub message: String,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Build an HTTP response with the standard error body
pub fn error_response(
    status: StatusCode,
    error_code: &'static str,
    message: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

/// Response for storage failures
///
/// The underlying detail is logged by the caller; the client only ever sees
/// a generic message.
pub fn database_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "DATABASE_ERROR",
        "A database error occurred",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse::new("EMPTY_CART", "No items in cart");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error_code"], "EMPTY_CART");
        assert_eq!(json["message"], "No items in cart");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_database_error_hides_detail() {
        let response = database_error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
