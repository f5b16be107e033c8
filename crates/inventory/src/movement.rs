use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, DomainError, DomainResult, MovementId, ProductId, WarehouseId};

use crate::batch::{Batch, StockKey};

/// Well-known `reference_type` tags. The field stays free-form.
pub mod reference_types {
    pub const BATCH_CREATION: &str = "batch_creation";
    pub const PURCHASE_ORDER: &str = "purchase_order";
    pub const ORDER: &str = "order";
    pub const ADJUSTMENT: &str = "adjustment";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }

    /// `in` is positive, `out` negative, `adjustment` either sign but never zero.
    pub fn check_delta(self, delta: i64) -> DomainResult<()> {
        let ok = match self {
            MovementType::In => delta > 0,
            MovementType::Out => delta < 0,
            MovementType::Adjustment => delta != 0,
        };
        if ok {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "quantity delta {delta} does not match movement type '{}'",
                self.as_str()
            )))
        }
    }
}

/// A movement about to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    pub product_id: ProductId,
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    pub warehouse_id: WarehouseId,
    pub movement_type: MovementType,
    pub quantity_delta: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    pub performed_by: String,
}

impl NewMovement {
    /// Receipt of a whole batch.
    pub fn stock_in(
        batch: &Batch,
        reference: Option<String>,
        reference_type: Option<String>,
        performed_by: impl Into<String>,
    ) -> Self {
        Self {
            product_id: batch.product_id(),
            batch_id: Some(batch.id()),
            warehouse_id: batch.warehouse_id(),
            movement_type: MovementType::In,
            quantity_delta: batch.quantity(),
            reference,
            reference_type,
            performed_by: performed_by.into(),
        }
    }

    /// Consumption of `taken` units from `batch_id`.
    pub fn stock_out(
        key: StockKey,
        batch_id: BatchId,
        taken: i64,
        reference: Option<String>,
        reference_type: Option<String>,
        performed_by: impl Into<String>,
    ) -> Self {
        Self {
            product_id: key.product_id,
            batch_id: Some(batch_id),
            warehouse_id: key.warehouse_id,
            movement_type: MovementType::Out,
            quantity_delta: -taken,
            reference,
            reference_type,
            performed_by: performed_by.into(),
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty"));
        }
        self.movement_type.check_delta(self.quantity_delta)
    }

    /// Seal the movement with its log position and timestamp.
    pub fn into_movement(
        self,
        id: MovementId,
        sequence: u64,
        created_at: DateTime<Utc>,
    ) -> StockMovement {
        StockMovement {
            id,
            sequence,
            product_id: self.product_id,
            batch_id: self.batch_id,
            warehouse_id: self.warehouse_id,
            movement_type: self.movement_type,
            quantity_delta: self.quantity_delta,
            reference: self.reference,
            reference_type: self.reference_type,
            performed_by: self.performed_by,
            created_at,
        }
    }
}

/// Immutable audit entry for a single quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: MovementId,
    /// Append position within the log (1-based, strictly increasing).
    pub sequence: u64,
    pub product_id: ProductId,
    pub batch_id: Option<BatchId>,
    pub warehouse_id: WarehouseId,
    pub movement_type: MovementType,
    pub quantity_delta: i64,
    pub reference: Option<String>,
    pub reference_type: Option<String>,
    pub performed_by: String,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }
}

/// Rebuild a batch's remaining quantity from its movements since creation.
pub fn replay_remaining<'a>(
    batch_id: BatchId,
    movements: impl IntoIterator<Item = &'a StockMovement>,
) -> i64 {
    movements
        .into_iter()
        .filter(|m| m.batch_id == Some(batch_id))
        .map(|m| m.quantity_delta)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ReceiveBatch;

    fn batch(quantity: i64) -> Batch {
        Batch::receive(
            BatchId::new(),
            ReceiveBatch::new(ProductId::new(), WarehouseId::new(), "B-1", quantity),
            Utc::now(),
        )
        .unwrap()
    }

    fn seal(m: NewMovement, seq: u64) -> StockMovement {
        m.into_movement(MovementId::new(), seq, Utc::now())
    }

    #[test]
    fn sign_convention_per_movement_type() {
        assert!(MovementType::In.check_delta(5).is_ok());
        assert!(MovementType::In.check_delta(-5).is_err());
        assert!(MovementType::Out.check_delta(-5).is_ok());
        assert!(MovementType::Out.check_delta(0).is_err());
        assert!(MovementType::Adjustment.check_delta(-2).is_ok());
        assert!(MovementType::Adjustment.check_delta(2).is_ok());
        assert!(MovementType::Adjustment.check_delta(0).is_err());
    }

    #[test]
    fn performer_is_required() {
        let b = batch(3);
        let m = NewMovement::stock_in(&b, None, None, " ");
        assert!(matches!(m.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn replay_sums_only_the_batch_own_movements() {
        let b = batch(10);
        let other = batch(7);

        let log = vec![
            seal(NewMovement::stock_in(&b, None, None, "alice"), 1),
            seal(NewMovement::stock_in(&other, None, None, "alice"), 2),
            seal(NewMovement::stock_out(b.key(), b.id(), 4, None, None, "bob"), 3),
            seal(NewMovement::stock_out(other.key(), other.id(), 7, None, None, "bob"), 4),
        ];

        assert_eq!(replay_remaining(b.id(), &log), 6);
        assert_eq!(replay_remaining(other.id(), &log), 0);
    }

    #[test]
    fn movement_type_serializes_lowercase() {
        let json = serde_json::to_value(MovementType::Adjustment).unwrap();
        assert_eq!(json, "adjustment");
    }
}
