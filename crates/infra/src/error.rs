//! Infrastructure and service-level errors.

use thiserror::Error;

use stockledger_core::{BatchId, DomainError};

/// Store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("batch not found: {0}")]
    BatchNotFound(BatchId),
    #[error("batch already exists: {0}")]
    AlreadyExists(BatchId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Storage(format!("{what} lock poisoned"))
    }
}

/// Error returned by ledger operations.
///
/// Every domain failure is surfaced as-is; the service performs no local
/// recovery and no retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The backing store failed (not a business-rule failure).
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::BatchNotFound(id) => LedgerError::Domain(DomainError::not_found("batch", id)),
            StoreError::AlreadyExists(id) => {
                LedgerError::Domain(DomainError::conflict(format!("batch {id} already exists")))
            }
            StoreError::Domain(e) => LedgerError::Domain(e),
            StoreError::Storage(msg) => LedgerError::Store(msg),
        }
    }
}

impl LedgerError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Domain(DomainError::Validation(_)) => "validation_error",
            LedgerError::Domain(DomainError::InvalidId(_)) => "validation_error",
            LedgerError::Domain(DomainError::InvariantViolation(_)) => "invariant_violation",
            LedgerError::Domain(DomainError::NotFound { .. }) => "not_found",
            LedgerError::Domain(DomainError::Conflict(_)) => "conflict",
            LedgerError::Domain(DomainError::InsufficientStock { .. }) => "insufficient_stock",
            LedgerError::Store(_) => "store_error",
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Store(_) => None,
        }
    }

    pub fn shortfall(&self) -> Option<i64> {
        self.domain().and_then(DomainError::shortfall)
    }
}
