#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use stockledger_core::{Clock, FixedClock, ProductId, WarehouseId};
use stockledger_infra::{
    BatchStore, ConsumptionMode, InMemoryInventoryService, InventoryService, LedgerConfig,
};
use stockledger_inventory::{AddStock, Batch, ReceiveBatch};

pub type TestService = InMemoryInventoryService<Arc<FixedClock>>;

pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub struct Ledger {
    pub service: TestService,
    pub clock: Arc<FixedClock>,
    pub product: ProductId,
    pub warehouse: WarehouseId,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_mode(ConsumptionMode::Atomic)
    }

    pub fn with_mode(mode: ConsumptionMode) -> Self {
        let clock = Arc::new(FixedClock::new(t0()));
        let config = LedgerConfig {
            consumption_mode: mode,
            ..LedgerConfig::default()
        };
        Self {
            service: InventoryService::in_memory(config, clock.clone()),
            clock,
            product: ProductId::new(),
            warehouse: WarehouseId::new(),
        }
    }

    pub fn receive(&self, params: ReceiveBatch) -> Batch {
        self.service
            .add_stock(AddStock::new(params), "receiver")
            .unwrap()
    }

    pub fn lot(&self, label: &str, quantity: i64) -> ReceiveBatch {
        ReceiveBatch::new(self.product, self.warehouse, label, quantity)
    }

    /// A batch received `received_days` from t0, expiring `expiry_days` from now.
    pub fn receive_lot(
        &self,
        label: &str,
        quantity: i64,
        received_days: i64,
        expiry_days: Option<i64>,
    ) -> Batch {
        let mut params = self.lot(label, quantity).received(t0() + Duration::days(received_days));
        if let Some(days) = expiry_days {
            params = params.expiring(self.clock.now() + Duration::days(days));
        }
        self.receive(params)
    }

    pub fn remaining(&self, batch: &Batch) -> i64 {
        self.service
            .get_batch(batch.id())
            .unwrap()
            .remaining_quantity()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.service
            .batch_store()
            .list_for(self.product, self.warehouse)
            .unwrap()
    }
}
