use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{database_error_response, error_response};
use crate::pricing::PricingError;

/// Error types for cart operations
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Cart line {0} not found")]
    NotFound(i32),

    #[error("Cart line {0} belongs to another user")]
    OwnershipMismatch(i32),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        CartError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CartError {
    fn from(err: validator::ValidationErrors) -> Self {
        CartError::ValidationError(err.to_string())
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        match self {
            CartError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            CartError::OwnershipMismatch(line_id) => {
                tracing::warn!("Rejected access to foreign cart line {}", line_id);
                error_response(StatusCode::FORBIDDEN, "OWNERSHIP_MISMATCH", self.to_string())
            }
            CartError::ValidationError(_) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            CartError::Pricing(err) => err.into_response(),
            CartError::DatabaseError(msg) => {
                tracing::error!("Database error in cart: {}", msg);
                database_error_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogKind;

    #[test]
    fn test_pricing_errors_keep_their_status() {
        let err = CartError::from(PricingError::NotPriced {
            kind: CatalogKind::Sweet,
            entity_id: 1,
            region_id: 1,
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_ownership_is_forbidden() {
        assert_eq!(
            CartError::OwnershipMismatch(3).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CartError::NotFound(3).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
