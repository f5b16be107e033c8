//! Merged audit trail over movements and adjustments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adjustment::StockAdjustment;
use crate::movement::StockMovement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuditEntry {
    Movement(StockMovement),
    Adjustment(StockAdjustment),
}

impl AuditEntry {
    pub fn entry_date(&self) -> DateTime<Utc> {
        match self {
            AuditEntry::Movement(m) => m.created_at,
            AuditEntry::Adjustment(a) => a.created_at,
        }
    }
}

/// Entries newer than `since`, newest first.
///
/// Inputs are expected in append order. On equal timestamps the later append
/// comes first, and a movement precedes the adjustment it documents.
pub fn merge_audit_trail(
    movements: Vec<StockMovement>,
    adjustments: Vec<StockAdjustment>,
    since: DateTime<Utc>,
) -> Vec<AuditEntry> {
    let mut entries: Vec<AuditEntry> = adjustments
        .into_iter()
        .map(AuditEntry::Adjustment)
        .chain(movements.into_iter().map(AuditEntry::Movement))
        .filter(|e| e.entry_date() >= since)
        .collect();

    entries.sort_by_key(AuditEntry::entry_date);
    entries.reverse();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::AdjustStock;
    use crate::batch::{Batch, ReceiveBatch};
    use crate::movement::NewMovement;
    use chrono::Duration;
    use stockledger_core::{AdjustmentId, BatchId, MovementId, ProductId, WarehouseId};

    #[test]
    fn merges_newest_first_and_drops_old_entries() {
        let now = Utc::now();
        let mut batch = Batch::receive(
            BatchId::new(),
            ReceiveBatch::new(ProductId::new(), WarehouseId::new(), "AU-1", 10),
            now - Duration::days(60),
        )
        .unwrap();

        let received = NewMovement::stock_in(&batch, None, None, "ops")
            .into_movement(MovementId::new(), 1, now - Duration::days(60));
        let taken = NewMovement::stock_out(batch.key(), batch.id(), 2, None, None, "ops")
            .into_movement(MovementId::new(), 2, now - Duration::days(5));
        batch.set_remaining(8).unwrap();

        let cmd = AdjustStock::new(batch.id(), 6, "auditor");
        let adjustment = StockAdjustment::record(
            AdjustmentId::new(),
            &cmd,
            &batch,
            8,
            now - Duration::days(1),
        );
        let adj_movement = adjustment
            .movement()
            .into_movement(MovementId::new(), 3, now - Duration::days(1));

        let trail = merge_audit_trail(
            vec![received, taken.clone(), adj_movement.clone()],
            vec![adjustment.clone()],
            now - Duration::days(30),
        );

        assert_eq!(
            trail,
            vec![
                AuditEntry::Movement(adj_movement),
                AuditEntry::Adjustment(adjustment),
                AuditEntry::Movement(taken),
            ]
        );
    }

    #[test]
    fn entries_are_tagged_by_kind() {
        let batch = Batch::receive(
            BatchId::new(),
            ReceiveBatch::new(ProductId::new(), WarehouseId::new(), "AU-2", 3),
            Utc::now(),
        )
        .unwrap();
        let m = NewMovement::stock_in(&batch, None, None, "ops")
            .into_movement(MovementId::new(), 1, Utc::now());

        let json = serde_json::to_value(AuditEntry::Movement(m)).unwrap();
        assert_eq!(json["type"], "movement");
        assert_eq!(json["movementType"], "in");
        assert_eq!(json["quantityDelta"], 3);
    }
}
