use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::calendar::CalendarError;
use crate::cart::CartError;
use crate::error::{database_error_response, error_response};
use crate::pricing::PricingError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(Uuid),

    /// A referenced resource belongs to another user
    #[error("Forbidden: {0}")]
    OwnershipMismatch(String),

    #[error("No items in cart")]
    EmptyCart,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for OrderError {
    fn from(err: validator::ValidationErrors) -> Self {
        OrderError::ValidationError(err.to_string())
    }
}

impl From<CartError> for OrderError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Pricing(err) => OrderError::Pricing(err),
            CartError::DatabaseError(msg) => OrderError::DatabaseError(msg),
            CartError::OwnershipMismatch(_) => OrderError::OwnershipMismatch(err.to_string()),
            CartError::NotFound(_) | CartError::ValidationError(_) => {
                OrderError::ValidationError(err.to_string())
            }
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        match self {
            OrderError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            OrderError::OwnershipMismatch(_) => {
                error_response(StatusCode::FORBIDDEN, "OWNERSHIP_MISMATCH", self.to_string())
            }
            OrderError::EmptyCart => {
                error_response(StatusCode::BAD_REQUEST, "EMPTY_CART", self.to_string())
            }
            OrderError::InvalidTransition(_) => {
                error_response(StatusCode::CONFLICT, "INVALID_TRANSITION", self.to_string())
            }
            OrderError::ValidationError(_) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            OrderError::Pricing(err) => err.into_response(),
            OrderError::Calendar(err) => err.into_response(),
            OrderError::DatabaseError(msg) => {
                tracing::error!("Database error in orders: {}", msg);
                database_error_response()
            }
        }
    }
}
