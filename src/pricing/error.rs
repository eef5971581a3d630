use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::catalog::CatalogKind;
use crate::error::{database_error_response, error_response};

/// Error types for price resolution and component assembly
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// No price row exists for the entity in the region
    #[error("{kind} {entity_id} is not priced in region {region_id}")]
    NotPriced {
        kind: CatalogKind,
        entity_id: i32,
        region_id: i32,
    },

    /// A stored row references catalog data that does not exist
    #[error("Integrity fault: {0}")]
    IntegrityFault(String),

    #[error("Region {0} not found")]
    RegionNotFound(i32),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

impl PricingError {
    pub fn is_not_priced(&self) -> bool {
        matches!(self, PricingError::NotPriced { .. })
    }
}

impl From<sqlx::Error> for PricingError {
    fn from(err: sqlx::Error) -> Self {
        PricingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        match &self {
            PricingError::NotPriced { .. } => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, "NOT_PRICED", self.to_string())
            }
            PricingError::IntegrityFault(msg) => {
                tracing::warn!("Catalog integrity fault: {}", msg);
                error_response(StatusCode::CONFLICT, "INTEGRITY_FAULT", self.to_string())
            }
            PricingError::RegionNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            PricingError::DatabaseError(msg) => {
                tracing::error!("Database error in pricing: {}", msg);
                database_error_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_priced_message() {
        let error = PricingError::NotPriced {
            kind: CatalogKind::Flavor,
            entity_id: 7,
            region_id: 2,
        };
        assert_eq!(error.to_string(), "flavor 7 is not priced in region 2");
        assert!(error.is_not_priced());
    }

    #[test]
    fn test_status_codes() {
        let not_priced = PricingError::NotPriced {
            kind: CatalogKind::Shape,
            entity_id: 1,
            region_id: 1,
        };
        assert_eq!(
            not_priced.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PricingError::IntegrityFault("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PricingError::DatabaseError("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_sqlx() {
        let error: PricingError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, PricingError::DatabaseError(_)));
    }
}
