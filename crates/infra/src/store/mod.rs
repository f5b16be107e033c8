//! Ledger storage abstractions and in-memory implementations.

pub mod adjustment_log;
pub mod batch_store;
pub mod movement_log;

use chrono::{DateTime, Utc};

use stockledger_core::{BatchId, ProductId, WarehouseId};

pub use adjustment_log::{AdjustmentLog, InMemoryAdjustmentLog};
pub use batch_store::{BatchFilter, BatchStore, InMemoryBatchStore};
pub use movement_log::{InMemoryMovementLog, MovementLog};

/// Filter for audit-log reads. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub product_id: Option<ProductId>,
    pub warehouse_id: Option<WarehouseId>,
    pub batch_id: Option<BatchId>,
    /// Inclusive lower bound on `created_at`.
    pub since: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_location(product_id: Option<ProductId>, warehouse_id: Option<WarehouseId>) -> Self {
        Self {
            product_id,
            warehouse_id,
            ..Self::default()
        }
    }

    pub fn for_batch(batch_id: BatchId) -> Self {
        Self {
            batch_id: Some(batch_id),
            ..Self::default()
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub(crate) fn matches(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        batch_id: Option<BatchId>,
        created_at: DateTime<Utc>,
    ) -> bool {
        self.product_id.is_none_or(|p| p == product_id)
            && self.warehouse_id.is_none_or(|w| w == warehouse_id)
            && self.batch_id.is_none_or(|b| Some(b) == batch_id)
            && self.since.is_none_or(|s| created_at >= s)
    }
}
