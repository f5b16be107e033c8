use std::sync::{Arc, RwLock};

use stockledger_inventory::StockAdjustment;

use super::LogFilter;
use crate::error::StoreError;

/// Append-only store of stock adjustments.
pub trait AdjustmentLog: Send + Sync {
    fn append(&self, adjustment: StockAdjustment) -> Result<StockAdjustment, StoreError>;

    /// Matching adjustments in append order.
    fn list(&self, filter: &LogFilter) -> Result<Vec<StockAdjustment>, StoreError>;
}

impl<S> AdjustmentLog for Arc<S>
where
    S: AdjustmentLog + ?Sized,
{
    fn append(&self, adjustment: StockAdjustment) -> Result<StockAdjustment, StoreError> {
        (**self).append(adjustment)
    }

    fn list(&self, filter: &LogFilter) -> Result<Vec<StockAdjustment>, StoreError> {
        (**self).list(filter)
    }
}

/// In-memory adjustment log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAdjustmentLog {
    entries: RwLock<Vec<StockAdjustment>>,
}

impl InMemoryAdjustmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl AdjustmentLog for InMemoryAdjustmentLog {
    fn append(&self, adjustment: StockAdjustment) -> Result<StockAdjustment, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::poisoned("adjustment log"))?;
        entries.push(adjustment.clone());
        Ok(adjustment)
    }

    fn list(&self, filter: &LogFilter) -> Result<Vec<StockAdjustment>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::poisoned("adjustment log"))?;
        Ok(entries
            .iter()
            .filter(|a| filter.matches(a.product_id, a.warehouse_id, Some(a.batch_id), a.created_at))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use stockledger_core::{AdjustmentId, BatchId, ProductId, WarehouseId};
    use stockledger_inventory::{AdjustStock, AdjustmentType, Batch, ReceiveBatch};

    fn adjustment(batch: &Batch, after: i64, at: chrono::DateTime<Utc>) -> StockAdjustment {
        let cmd = AdjustStock::new(batch.id(), after, "auditor")
            .because(AdjustmentType::Damaged, "crushed pallet");
        StockAdjustment::record(AdjustmentId::new(), &cmd, batch, batch.remaining_quantity(), at)
    }

    #[test]
    fn lists_in_append_order_with_filters() {
        let log = InMemoryAdjustmentLog::new();
        let now = Utc::now();
        let (p, w) = (ProductId::new(), WarehouseId::new());
        let a = Batch::receive(BatchId::new(), ReceiveBatch::new(p, w, "A", 10), now).unwrap();
        let b = Batch::receive(BatchId::new(), ReceiveBatch::new(ProductId::new(), w, "B", 4), now)
            .unwrap();

        log.append(adjustment(&a, 8, now - Duration::days(45))).unwrap();
        log.append(adjustment(&b, 1, now - Duration::days(1))).unwrap();
        log.append(adjustment(&a, 6, now)).unwrap();

        let all = log.list(&LogFilter::all()).unwrap();
        assert_eq!(
            all.iter().map(|x| x.quantity_after).collect::<Vec<_>>(),
            vec![8, 1, 6]
        );

        let for_a = log.list(&LogFilter::for_batch(a.id())).unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|x| x.adjustment_type == AdjustmentType::Damaged));

        let recent = log
            .list(&LogFilter::for_location(None, Some(w)).since(now - Duration::days(30)))
            .unwrap();
        assert_eq!(recent.len(), 2);
    }
}
