use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use stockledger_core::MovementId;
use stockledger_inventory::{NewMovement, StockMovement};

use super::LogFilter;
use crate::error::StoreError;

/// Append-only stock movement log.
pub trait MovementLog: Send + Sync {
    /// Append a movement. Validates required fields and the sign convention;
    /// assigns id, sequence and timestamp.
    fn record(&self, movement: NewMovement, at: DateTime<Utc>) -> Result<StockMovement, StoreError>;

    /// Matching movements in append order.
    fn list(&self, filter: &LogFilter) -> Result<Vec<StockMovement>, StoreError>;
}

impl<S> MovementLog for Arc<S>
where
    S: MovementLog + ?Sized,
{
    fn record(&self, movement: NewMovement, at: DateTime<Utc>) -> Result<StockMovement, StoreError> {
        (**self).record(movement, at)
    }

    fn list(&self, filter: &LogFilter) -> Result<Vec<StockMovement>, StoreError> {
        (**self).list(filter)
    }
}

/// In-memory movement log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMovementLog {
    entries: RwLock<Vec<StockMovement>>,
}

impl InMemoryMovementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MovementLog for InMemoryMovementLog {
    fn record(&self, movement: NewMovement, at: DateTime<Utc>) -> Result<StockMovement, StoreError> {
        movement.validate()?;

        let mut entries = self.entries.write().map_err(|_| StoreError::poisoned("movement log"))?;
        let sequence = entries.len() as u64 + 1;
        let sealed = movement.into_movement(MovementId::new(), sequence, at);
        entries.push(sealed.clone());
        Ok(sealed)
    }

    fn list(&self, filter: &LogFilter) -> Result<Vec<StockMovement>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::poisoned("movement log"))?;
        Ok(entries
            .iter()
            .filter(|m| filter.matches(m.product_id, m.warehouse_id, m.batch_id, m.created_at))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockledger_core::{BatchId, DomainError, ProductId, WarehouseId};
    use stockledger_inventory::{MovementType, StockKey};

    fn out(key: StockKey, batch: BatchId, qty: i64) -> NewMovement {
        NewMovement::stock_out(key, batch, qty, Some("SO-1".into()), Some("order".into()), "picker")
    }

    #[test]
    fn appends_with_increasing_sequence() {
        let log = InMemoryMovementLog::new();
        let key = StockKey::new(ProductId::new(), WarehouseId::new());
        let batch = BatchId::new();
        let now = Utc::now();

        let first = log.record(out(key, batch, 2), now).unwrap();
        let second = log.record(out(key, batch, 3), now).unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.quantity_delta, -3);
        assert_eq!(second.movement_type, MovementType::Out);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn rejects_malformed_movements_without_appending() {
        let log = InMemoryMovementLog::new();
        let key = StockKey::new(ProductId::new(), WarehouseId::new());

        let mut wrong_sign = out(key, BatchId::new(), 2);
        wrong_sign.quantity_delta = 2;
        assert!(matches!(
            log.record(wrong_sign, Utc::now()),
            Err(StoreError::Domain(DomainError::Validation(_)))
        ));

        let mut anonymous = out(key, BatchId::new(), 2);
        anonymous.performed_by.clear();
        assert!(log.record(anonymous, Utc::now()).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn filters_by_location_batch_and_age() {
        let log = InMemoryMovementLog::new();
        let (p, w) = (ProductId::new(), WarehouseId::new());
        let key = StockKey::new(p, w);
        let other = StockKey::new(ProductId::new(), w);
        let (b1, b2) = (BatchId::new(), BatchId::new());
        let now = Utc::now();

        log.record(out(key, b1, 1), now - Duration::days(40)).unwrap();
        log.record(out(key, b2, 1), now - Duration::days(2)).unwrap();
        log.record(out(other, BatchId::new(), 1), now).unwrap();

        assert_eq!(log.list(&LogFilter::for_location(Some(p), None)).unwrap().len(), 2);
        assert_eq!(log.list(&LogFilter::for_location(None, Some(w))).unwrap().len(), 3);
        assert_eq!(log.list(&LogFilter::for_batch(b1)).unwrap().len(), 1);

        let recent = log
            .list(&LogFilter::for_location(Some(p), Some(w)).since(now - Duration::days(30)))
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].batch_id, Some(b2));
    }
}
