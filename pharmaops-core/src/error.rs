use pharmaops_catalog::CatalogError;
use pharmaops_order::OrderError;

use crate::repository::StoreError;

/// Errors surfaced by the compliance workflow. Every operation fails closed:
/// when one of these is returned nothing was persisted.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    InvalidState(String),

    /// Another transaction touched the same rows; safe to retry
    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ComplianceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ComplianceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ComplianceError::ConcurrencyConflict(_))
    }
}

pub type ComplianceResult<T> = Result<T, ComplianceError>;

impl From<StoreError> for ComplianceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ComplianceError::ConcurrencyConflict(msg),
            other => ComplianceError::Storage(other.to_string()),
        }
    }
}

impl From<OrderError> for ComplianceError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::MissingField(_) | OrderError::Validation(_) => ComplianceError::Validation(err.to_string()),
            OrderError::NotOwned(id) => ComplianceError::not_found("Order", id),
            OrderError::InvalidState(msg) => ComplianceError::InvalidState(msg),
            OrderError::InvalidTransition { .. } => ComplianceError::InvalidState(err.to_string()),
        }
    }
}

impl From<CatalogError> for ComplianceError {
    fn from(err: CatalogError) -> Self {
        ComplianceError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_is_retryable() {
        let err: ComplianceError = StoreError::Conflict("order_number".into()).into();
        assert!(err.is_retryable());

        let err: ComplianceError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, ComplianceError::Storage(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_order_error_mapping() {
        let err: ComplianceError = OrderError::MissingField("quantity").into();
        assert_eq!(err.to_string(), "Validation failed: quantity is required");

        let err: ComplianceError = OrderError::NotOwned("abc".into()).into();
        assert!(matches!(err, ComplianceError::NotFound { entity: "Order", .. }));

        let err: ComplianceError = OrderError::InvalidState("Order is not ready to ship".into()).into();
        assert_eq!(err.to_string(), "Order is not ready to ship");
    }
}
