use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{AdjustmentId, BatchId, DomainError, DomainResult, ProductId, WarehouseId};

use crate::batch::{Batch, StockKey};
use crate::movement::{MovementType, NewMovement, reference_types};

/// Why a batch's remaining quantity was corrected by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Damaged,
    Expired,
    Theft,
    #[default]
    Correction,
}

/// Command: set a batch's remaining quantity to an explicit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStock {
    pub batch_id: BatchId,
    /// The quantity the caller saw. Taken from the batch when absent.
    #[serde(default)]
    pub quantity_before: Option<i64>,
    pub quantity_after: i64,
    #[serde(default)]
    pub adjustment_type: AdjustmentType,
    #[serde(default)]
    pub reason: Option<String>,
    pub adjusted_by: String,
}

impl AdjustStock {
    pub fn new(batch_id: BatchId, quantity_after: i64, adjusted_by: impl Into<String>) -> Self {
        Self {
            batch_id,
            quantity_before: None,
            quantity_after,
            adjustment_type: AdjustmentType::default(),
            reason: None,
            adjusted_by: adjusted_by.into(),
        }
    }

    pub fn expecting(mut self, quantity_before: i64) -> Self {
        self.quantity_before = Some(quantity_before);
        self
    }

    pub fn because(mut self, adjustment_type: AdjustmentType, reason: impl Into<String>) -> Self {
        self.adjustment_type = adjustment_type;
        self.reason = Some(reason.into());
        self
    }

    /// Check the command against the batch it targets and return the
    /// effective `quantity_before`.
    pub fn check_against(&self, batch: &Batch) -> DomainResult<i64> {
        if batch.id() != self.batch_id {
            return Err(DomainError::invariant("batch_id mismatch"));
        }
        if self.adjusted_by.trim().is_empty() {
            return Err(DomainError::validation("adjusted_by cannot be empty"));
        }

        let current = batch.remaining_quantity();
        let before = self.quantity_before.unwrap_or(current);
        if before != current {
            return Err(DomainError::conflict(format!(
                "batch {} holds {current} units, adjustment expected {before}",
                self.batch_id
            )));
        }

        batch.check_remaining(self.quantity_after)?;

        if self.quantity_after == before {
            return Err(DomainError::validation("adjustment must change the quantity"));
        }
        Ok(before)
    }
}

/// Immutable record of an applied adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub id: AdjustmentId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub batch_id: BatchId,
    pub adjustment_type: AdjustmentType,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub reason: Option<String>,
    pub adjusted_by: String,
    pub created_at: DateTime<Utc>,
}

impl StockAdjustment {
    pub fn record(
        id: AdjustmentId,
        command: &AdjustStock,
        batch: &Batch,
        quantity_before: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id: batch.product_id(),
            warehouse_id: batch.warehouse_id(),
            batch_id: batch.id(),
            adjustment_type: command.adjustment_type,
            quantity_before,
            quantity_after: command.quantity_after,
            reason: command.reason.clone(),
            adjusted_by: command.adjusted_by.clone(),
            created_at,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }

    pub fn delta(&self) -> i64 {
        self.quantity_after - self.quantity_before
    }

    /// The `adjustment` movement that accompanies this record.
    pub fn movement(&self) -> NewMovement {
        NewMovement {
            product_id: self.product_id,
            batch_id: Some(self.batch_id),
            warehouse_id: self.warehouse_id,
            movement_type: MovementType::Adjustment,
            quantity_delta: self.delta(),
            reference: Some(self.id.to_string()),
            reference_type: Some(reference_types::ADJUSTMENT.to_string()),
            performed_by: self.adjusted_by.clone(),
        }
    }
}
