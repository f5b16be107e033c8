use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockledger_core::{BatchId, ProductId, WarehouseId};
use stockledger_inventory::{Batch, StockKey};

use crate::error::StoreError;

/// Filter for batch listings. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchFilter {
    pub product_id: Option<ProductId>,
    pub warehouse_id: Option<WarehouseId>,
}

impl BatchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(product_id: Option<ProductId>, warehouse_id: Option<WarehouseId>) -> Self {
        Self {
            product_id,
            warehouse_id,
        }
    }

    fn matches(&self, batch: &Batch) -> bool {
        self.product_id.is_none_or(|p| p == batch.product_id())
            && self.warehouse_id.is_none_or(|w| w == batch.warehouse_id())
    }
}

/// Storage and lookup of batches.
///
/// Batches are never deleted; a depleted batch stays as a zero-quantity record.
pub trait BatchStore: Send + Sync {
    /// Store a newly received batch.
    fn create(&self, batch: Batch) -> Result<Batch, StoreError>;

    fn get(&self, batch_id: BatchId) -> Result<Option<Batch>, StoreError>;

    /// All batches for one product/warehouse pair, depleted ones included.
    /// Order is unspecified; consumers sort explicitly.
    fn list_for(&self, product_id: ProductId, warehouse_id: WarehouseId)
    -> Result<Vec<Batch>, StoreError>;

    fn list(&self, filter: &BatchFilter) -> Result<Vec<Batch>, StoreError>;

    /// Fails with `BatchNotFound` for unknown ids and with an invariant
    /// violation when `new_quantity` is outside `[0, quantity]`.
    fn set_remaining(&self, batch_id: BatchId, new_quantity: i64) -> Result<Batch, StoreError>;
}

impl<S> BatchStore for Arc<S>
where
    S: BatchStore + ?Sized,
{
    fn create(&self, batch: Batch) -> Result<Batch, StoreError> {
        (**self).create(batch)
    }

    fn get(&self, batch_id: BatchId) -> Result<Option<Batch>, StoreError> {
        (**self).get(batch_id)
    }

    fn list_for(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<Batch>, StoreError> {
        (**self).list_for(product_id, warehouse_id)
    }

    fn list(&self, filter: &BatchFilter) -> Result<Vec<Batch>, StoreError> {
        (**self).list(filter)
    }

    fn set_remaining(&self, batch_id: BatchId, new_quantity: i64) -> Result<Batch, StoreError> {
        (**self).set_remaining(batch_id, new_quantity)
    }
}

#[derive(Debug, Default)]
struct BatchTable {
    /// Arrival order.
    rows: Vec<Batch>,
    index: HashMap<BatchId, usize>,
    by_key: HashMap<StockKey, Vec<usize>>,
}

/// In-memory batch store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBatchStore {
    inner: RwLock<BatchTable>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl BatchStore for InMemoryBatchStore {
    fn create(&self, batch: Batch) -> Result<Batch, StoreError> {
        let mut table = self.inner.write().map_err(|_| StoreError::poisoned("batch table"))?;
        let id = batch.id();
        if table.index.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let pos = table.rows.len();
        table.index.insert(id, pos);
        table.by_key.entry(batch.key()).or_default().push(pos);
        table.rows.push(batch.clone());
        Ok(batch)
    }

    fn get(&self, batch_id: BatchId) -> Result<Option<Batch>, StoreError> {
        let table = self.inner.read().map_err(|_| StoreError::poisoned("batch table"))?;
        Ok(table.index.get(&batch_id).map(|&pos| table.rows[pos].clone()))
    }

    fn list_for(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<Batch>, StoreError> {
        let table = self.inner.read().map_err(|_| StoreError::poisoned("batch table"))?;
        let key = StockKey::new(product_id, warehouse_id);
        Ok(table
            .by_key
            .get(&key)
            .map(|positions| positions.iter().map(|&pos| table.rows[pos].clone()).collect())
            .unwrap_or_default())
    }

    fn list(&self, filter: &BatchFilter) -> Result<Vec<Batch>, StoreError> {
        let table = self.inner.read().map_err(|_| StoreError::poisoned("batch table"))?;
        Ok(table
            .rows
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    fn set_remaining(&self, batch_id: BatchId, new_quantity: i64) -> Result<Batch, StoreError> {
        let mut table = self.inner.write().map_err(|_| StoreError::poisoned("batch table"))?;
        let pos = *table
            .index
            .get(&batch_id)
            .ok_or(StoreError::BatchNotFound(batch_id))?;

        let batch = &mut table.rows[pos];
        batch.set_remaining(new_quantity)?;
        Ok(batch.clone())
    }
}
