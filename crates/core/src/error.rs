//! Domain error model.

use thiserror::Error;

use crate::id::{ProductId, WarehouseId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts, stock shortfalls). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced batch, product or warehouse does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller acted on stale state (e.g. an adjustment's `quantity_before`
    /// no longer matches the batch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A consumption request exceeds the remaining stock across all eligible
    /// batches.
    #[error(
        "insufficient stock for product {product_id} at warehouse {warehouse_id}: \
         requested {requested}, short by {shortfall}"
    )]
    InsufficientStock {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        requested: i64,
        shortfall: i64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn insufficient_stock(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        requested: i64,
        shortfall: i64,
    ) -> Self {
        Self::InsufficientStock {
            product_id,
            warehouse_id,
            requested,
            shortfall,
        }
    }

    /// Shortfall carried by an `InsufficientStock` error.
    pub fn shortfall(&self) -> Option<i64> {
        match self {
            Self::InsufficientStock { shortfall, .. } => Some(*shortfall),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_the_shortfall() {
        let err = DomainError::insufficient_stock(ProductId::new(), WarehouseId::new(), 10, 2);
        assert_eq!(err.shortfall(), Some(2));
        assert!(err.to_string().contains("short by 2"));
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = DomainError::not_found("batch", "abc");
        assert_eq!(err.to_string(), "batch not found: abc");
        assert_eq!(err.shortfall(), None);
    }
}
