//! Consumption planning.
//!
//! Planning is pure: it decides which batches satisfy a request and how much
//! each gives up. Applying the plan (decrements + `out` movements) is up to the
//! caller, which also picks between all-or-nothing and partial application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, DomainError, DomainResult, ProductId, WarehouseId};

use crate::batch::{Batch, StockKey};
use crate::ordering::eligible_in_order;

/// Command: draw `quantity` units of a product from a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeStock {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    pub performed_by: String,
}

impl ConsumeStock {
    pub fn new(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        performed_by: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            warehouse_id,
            quantity,
            reference: None,
            reference_type: None,
            performed_by: performed_by.into(),
        }
    }

    pub fn referencing(mut self, reference: impl Into<String>, reference_type: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self.reference_type = Some(reference_type.into());
        self
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("consumption quantity must be positive"));
        }
        if self.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        Ok(())
    }
}

/// One batch's contribution to a consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedBatch {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub quantity_taken: i64,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Which batches satisfied a consumption, in draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionResult {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub requested: i64,
    pub consumed: Vec<ConsumedBatch>,
}

impl ConsumptionResult {
    pub fn total_taken(&self) -> i64 {
        self.consumed.iter().map(|c| c.quantity_taken).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDraw {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub take: i64,
    pub remaining_after: i64,
}

impl PlannedDraw {
    pub fn consumed(&self) -> ConsumedBatch {
        ConsumedBatch {
            batch_id: self.batch_id,
            batch_number: self.batch_number.clone(),
            quantity_taken: self.take,
            expiry_date: self.expiry_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    pub requested: i64,
    pub draws: Vec<PlannedDraw>,
    /// Units the eligible batches could not cover (0 when satisfied).
    pub shortfall: i64,
}

impl ConsumptionPlan {
    pub fn is_satisfied(&self) -> bool {
        self.shortfall == 0
    }

    pub fn planned_total(&self) -> i64 {
        self.draws.iter().map(|d| d.take).sum()
    }
}

/// Plan a draw of `quantity` units from `batches` in consumption order.
///
/// Batches without remaining stock are skipped. The walk stops as soon as the
/// request is covered; otherwise every eligible batch is drained and the
/// uncovered amount is reported as `shortfall`.
pub fn plan_consumption<'a>(
    batches: impl IntoIterator<Item = &'a Batch>,
    quantity: i64,
) -> ConsumptionPlan {
    let mut still_needed = quantity.max(0);
    let mut draws = Vec::new();

    for batch in eligible_in_order(batches) {
        if still_needed == 0 {
            break;
        }
        let take = batch.remaining_quantity().min(still_needed);
        draws.push(PlannedDraw {
            batch_id: batch.id(),
            batch_number: batch.batch_number().to_string(),
            expiry_date: batch.expiry_date(),
            take,
            remaining_after: batch.remaining_quantity() - take,
        });
        still_needed -= take;
    }

    ConsumptionPlan {
        requested: quantity,
        draws,
        shortfall: still_needed,
    }
}
