use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{database_error_response, error_response};

/// Error types for the business calendar and delivery scheduling
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid calendar configuration: {0}")]
    InvalidConfiguration(String),

    /// The global open switch is off
    #[error("The bakery is closed: {0}")]
    StoreClosed(String),

    #[error("No delivery date available within {0} days")]
    NoDeliveryDate(u32),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CalendarError {
    fn from(err: sqlx::Error) -> Self {
        CalendarError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CalendarError {
    fn from(err: validator::ValidationErrors) -> Self {
        CalendarError::ValidationError(err.to_string())
    }
}

impl IntoResponse for CalendarError {
    fn into_response(self) -> Response {
        match &self {
            CalendarError::ValidationError(_) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            CalendarError::InvalidConfiguration(_) => error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_CONFIGURATION",
                self.to_string(),
            ),
            CalendarError::StoreClosed(_) => {
                error_response(StatusCode::CONFLICT, "STORE_CLOSED", self.to_string())
            }
            CalendarError::NoDeliveryDate(_) => {
                tracing::warn!("{}", self);
                error_response(StatusCode::CONFLICT, "NO_DELIVERY_DATE", self.to_string())
            }
            CalendarError::DatabaseError(msg) => {
                tracing::error!("Database error in calendar: {}", msg);
                database_error_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_closed_is_conflict() {
        let response = CalendarError::StoreClosed("Holiday break".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let response = CalendarError::ValidationError("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
