//! Inventory ledger service.
//!
//! Composes the batch store, the movement and adjustment logs, a clock and the
//! per-pair locks into the ledger's operations:
//!
//! ```text
//! add_stock      -> create batch -> record `in`
//! consume_stock  -> lock pair -> plan FEFO/FIFO draws -> decrement + record `out` per draw
//! adjust_stock   -> lock pair -> set remaining -> append adjustment -> record `adjustment`
//! forecasts      -> snapshot reads, no mutation
//! ```
//!
//! Every failure is returned to the caller; nothing is retried here.

use tracing::{debug, info, warn};

use stockledger_core::{
    AdjustmentId, BatchId, Clock, DomainError, ProductId, SystemClock, WarehouseId,
};
use stockledger_inventory::{
    AddStock, AdjustStock, AuditEntry, Batch, ConsumeStock, ConsumptionResult, ExpiringBatch,
    ForecastEntry, NewMovement, ReceivePurchaseOrder, StockAdjustment, StockKey, StockSummary,
    build_forecast, expiring_batches, merge_audit_trail, offset_days, plan_consumption,
    reference_types, summarize_stock,
};

use crate::config::{ConsumptionMode, LedgerConfig};
use crate::error::LedgerError;
use crate::locks::KeyedLocks;
use crate::store::{
    AdjustmentLog, BatchFilter, BatchStore, InMemoryAdjustmentLog, InMemoryBatchStore,
    InMemoryMovementLog, LogFilter, MovementLog,
};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Service wired to the in-memory stores.
pub type InMemoryInventoryService<C = SystemClock> =
    InventoryService<InMemoryBatchStore, InMemoryMovementLog, InMemoryAdjustmentLog, C>;

pub struct InventoryService<B, M, A, C = SystemClock> {
    batches: B,
    movements: M,
    adjustments: A,
    clock: C,
    config: LedgerConfig,
    locks: KeyedLocks<StockKey>,
}

impl<C: Clock> InMemoryInventoryService<C> {
    pub fn in_memory(config: LedgerConfig, clock: C) -> Self {
        InventoryService::new(
            InMemoryBatchStore::new(),
            InMemoryMovementLog::new(),
            InMemoryAdjustmentLog::new(),
            clock,
            config,
        )
    }
}

impl<B, M, A, C> InventoryService<B, M, A, C>
where
    B: BatchStore,
    M: MovementLog,
    A: AdjustmentLog,
    C: Clock,
{
    pub fn new(batches: B, movements: M, adjustments: A, clock: C, config: LedgerConfig) -> Self {
        Self {
            batches,
            movements,
            adjustments,
            clock,
            config,
            locks: KeyedLocks::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn batch_store(&self) -> &B {
        &self.batches
    }

    pub fn movement_log(&self) -> &M {
        &self.movements
    }

    pub fn adjustment_log(&self) -> &A {
        &self.adjustments
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn get_batch(&self, batch_id: BatchId) -> LedgerResult<Batch> {
        self.batches
            .get(batch_id)?
            .ok_or_else(|| DomainError::not_found("batch", batch_id).into())
    }

    /// Receive a batch and record its `in` movement.
    ///
    /// The reference defaults to the new batch id with reference type
    /// `batch_creation`.
    pub fn add_stock(&self, command: AddStock, performed_by: &str) -> LedgerResult<Batch> {
        command.validate()?;
        if performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty").into());
        }

        let key = command.batch.key();
        self.locks.with_lock(&key, || -> LedgerResult<Batch> {
            let now = self.clock.now();
            let batch = Batch::receive(BatchId::new(), command.batch, now)?;
            let batch = self.batches.create(batch)?;

            let reference = command
                .reference
                .unwrap_or_else(|| batch.id().to_string());
            let reference_type = command
                .reference_type
                .unwrap_or_else(|| reference_types::BATCH_CREATION.to_string());

            self.movements.record(
                NewMovement::stock_in(&batch, Some(reference), Some(reference_type), performed_by),
                now,
            )?;

            info!(
                product_id = %key.product_id,
                warehouse_id = %key.warehouse_id,
                batch_id = %batch.id(),
                batch_number = batch.batch_number(),
                quantity = batch.quantity(),
                "stock received"
            );
            Ok(batch)
        })
    }

    /// Receive every line of a purchase order (`purchase_order` reference).
    ///
    /// All lines are validated before the first batch is created.
    pub fn receive_purchase_order(
        &self,
        command: ReceivePurchaseOrder,
        performed_by: &str,
    ) -> LedgerResult<Vec<Batch>> {
        if performed_by.trim().is_empty() {
            return Err(DomainError::validation("performed_by cannot be empty").into());
        }
        let purchase_order_id = command.purchase_order_id.clone();
        let receipts = command.into_receipts()?;

        let batches = receipts
            .into_iter()
            .map(|receipt| self.add_stock(receipt, performed_by))
            .collect::<LedgerResult<Vec<_>>>()?;

        info!(
            purchase_order_id = %purchase_order_id,
            lines = batches.len(),
            "purchase order received"
        );
        Ok(batches)
    }

    /// Consume stock using the configured [`ConsumptionMode`].
    pub fn consume_stock(&self, command: ConsumeStock) -> LedgerResult<ConsumptionResult> {
        self.consume_stock_with(command, self.config.consumption_mode)
    }

    /// Draw `command.quantity` units in FEFO-then-FIFO order.
    ///
    /// With [`ConsumptionMode::Atomic`] an uncoverable request fails before any
    /// batch is touched. With [`ConsumptionMode::PartialApply`] every eligible
    /// batch is drained before the shortfall is reported, and those draws stay
    /// applied. In both modes the failure is `InsufficientStock` carrying the
    /// shortfall.
    pub fn consume_stock_with(
        &self,
        command: ConsumeStock,
        mode: ConsumptionMode,
    ) -> LedgerResult<ConsumptionResult> {
        command.validate()?;
        let key = command.key();

        self.locks.with_lock(&key, || -> LedgerResult<ConsumptionResult> {
            let batches = self.batches.list_for(key.product_id, key.warehouse_id)?;
            let plan = plan_consumption(&batches, command.quantity);

            let insufficient = || {
                LedgerError::from(DomainError::insufficient_stock(
                    key.product_id,
                    key.warehouse_id,
                    command.quantity,
                    plan.shortfall,
                ))
            };

            if mode == ConsumptionMode::Atomic && !plan.is_satisfied() {
                warn!(
                    product_id = %key.product_id,
                    warehouse_id = %key.warehouse_id,
                    requested = command.quantity,
                    shortfall = plan.shortfall,
                    "insufficient stock; nothing consumed"
                );
                return Err(insufficient());
            }

            let now = self.clock.now();
            let mut consumed = Vec::with_capacity(plan.draws.len());
            for draw in &plan.draws {
                self.batches.set_remaining(draw.batch_id, draw.remaining_after)?;
                self.movements.record(
                    NewMovement::stock_out(
                        key,
                        draw.batch_id,
                        draw.take,
                        command.reference.clone(),
                        command.reference_type.clone(),
                        command.performed_by.as_str(),
                    ),
                    now,
                )?;
                debug!(
                    batch_id = %draw.batch_id,
                    taken = draw.take,
                    remaining = draw.remaining_after,
                    "batch drawn"
                );
                consumed.push(draw.consumed());
            }

            if !plan.is_satisfied() {
                warn!(
                    product_id = %key.product_id,
                    warehouse_id = %key.warehouse_id,
                    requested = command.quantity,
                    applied = plan.planned_total(),
                    shortfall = plan.shortfall,
                    "insufficient stock; partial draws left applied"
                );
                return Err(insufficient());
            }

            info!(
                product_id = %key.product_id,
                warehouse_id = %key.warehouse_id,
                quantity = command.quantity,
                batches = consumed.len(),
                "stock consumed"
            );
            Ok(ConsumptionResult {
                product_id: key.product_id,
                warehouse_id: key.warehouse_id,
                requested: command.quantity,
                consumed,
            })
        })
    }

    /// Set a batch's remaining quantity to an explicit value, recording both
    /// the adjustment and its `adjustment` movement.
    pub fn adjust_stock(&self, command: AdjustStock) -> LedgerResult<StockAdjustment> {
        let key = self.get_batch(command.batch_id)?.key();

        self.locks.with_lock(&key, || -> LedgerResult<StockAdjustment> {
            // Re-read under the lock: the pre-lock read only located the pair.
            let batch = self.get_batch(command.batch_id)?;
            let before = command.check_against(&batch)?;

            let now = self.clock.now();
            let adjustment =
                StockAdjustment::record(AdjustmentId::new(), &command, &batch, before, now);

            self.batches.set_remaining(batch.id(), command.quantity_after)?;
            let adjustment = self.adjustments.append(adjustment)?;
            self.movements.record(adjustment.movement(), now)?;

            info!(
                product_id = %key.product_id,
                warehouse_id = %key.warehouse_id,
                batch_id = %batch.id(),
                quantity_before = before,
                quantity_after = command.quantity_after,
                "stock adjusted"
            );
            Ok(adjustment)
        })
    }

    /// Days-until-stockout and expiry risk per product/warehouse pair.
    pub fn get_stock_forecast(
        &self,
        product_id: Option<ProductId>,
        warehouse_id: Option<WarehouseId>,
    ) -> LedgerResult<Vec<ForecastEntry>> {
        let now = self.clock.now();
        let policy = self.config.forecast;

        let batches = self.batches.list(&BatchFilter::new(product_id, warehouse_id))?;
        let movements = self.movements.list(
            &LogFilter::for_location(product_id, warehouse_id)
                .since(offset_days(now, -policy.window_days.max(0))),
        )?;

        Ok(build_forecast(&batches, &movements, now, &policy))
    }

    /// Batches holding stock that expire within `within_days`, soonest first.
    pub fn get_expiring_stock(&self, within_days: i64) -> LedgerResult<Vec<ExpiringBatch>> {
        if within_days < 0 {
            return Err(DomainError::validation("within_days cannot be negative").into());
        }
        let batches = self.batches.list(&BatchFilter::all())?;
        Ok(expiring_batches(&batches, within_days, self.clock.now()))
    }

    /// Movements and adjustments from the last `since_days` days, newest first.
    pub fn get_audit_trail(
        &self,
        product_id: Option<ProductId>,
        warehouse_id: Option<WarehouseId>,
        since_days: i64,
    ) -> LedgerResult<Vec<AuditEntry>> {
        if since_days < 0 {
            return Err(DomainError::validation("since_days cannot be negative").into());
        }
        let since = offset_days(self.clock.now(), -since_days);
        let filter = LogFilter::for_location(product_id, warehouse_id).since(since);

        let movements = self.movements.list(&filter)?;
        let adjustments = self.adjustments.list(&filter)?;
        Ok(merge_audit_trail(movements, adjustments, since))
    }

    /// Stock level and value per product/warehouse pair.
    pub fn get_stock_summary(
        &self,
        product_id: Option<ProductId>,
        warehouse_id: Option<WarehouseId>,
    ) -> LedgerResult<Vec<StockSummary>> {
        let batches = self.batches.list(&BatchFilter::new(product_id, warehouse_id))?;
        Ok(summarize_stock(&batches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use stockledger_core::FixedClock;
    use stockledger_inventory::{MovementType, ReceiveBatch, replay_remaining};

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn service() -> (InMemoryInventoryService<Arc<FixedClock>>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(start()));
        (
            InventoryService::in_memory(LedgerConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn add_stock_records_batch_creation_movement() {
        let (svc, _) = service();
        let (p, w) = (ProductId::new(), WarehouseId::new());

        let batch = svc
            .add_stock(AddStock::new(ReceiveBatch::new(p, w, "R-1", 12)), "receiver")
            .unwrap();

        let movements = svc.movement_log().list(&LogFilter::for_batch(batch.id())).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::In);
        assert_eq!(movements[0].quantity_delta, 12);
        assert_eq!(movements[0].reference_type.as_deref(), Some(reference_types::BATCH_CREATION));
        assert_eq!(movements[0].reference, Some(batch.id().to_string()));
        assert_eq!(movements[0].created_at, start());
    }

    #[test]
    fn add_stock_rejects_anonymous_receipts_without_side_effects() {
        let (svc, _) = service();
        let (p, w) = (ProductId::new(), WarehouseId::new());

        let err = svc
            .add_stock(AddStock::new(ReceiveBatch::new(p, w, "R-2", 5)), "")
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(svc.batch_store().list(&BatchFilter::all()).unwrap().is_empty());
        assert!(svc.movement_log().is_empty());
    }

    #[test]
    fn adjusting_unknown_batch_is_not_found() {
        let (svc, _) = service();
        let err = svc
            .adjust_stock(AdjustStock::new(BatchId::new(), 1, "auditor"))
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn replay_matches_after_mixed_operations() {
        let (svc, clock) = service();
        let (p, w) = (ProductId::new(), WarehouseId::new());

        let batch = svc
            .add_stock(AddStock::new(ReceiveBatch::new(p, w, "R-3", 40)), "receiver")
            .unwrap();
        clock.advance(Duration::hours(2));
        svc.consume_stock(ConsumeStock::new(p, w, 15, "picker")).unwrap();
        clock.advance(Duration::hours(2));
        svc.adjust_stock(AdjustStock::new(batch.id(), 20, "auditor"))
            .unwrap();

        let current = svc.get_batch(batch.id()).unwrap();
        let movements = svc.movement_log().list(&LogFilter::all()).unwrap();
        assert_eq!(current.remaining_quantity(), 20);
        assert_eq!(replay_remaining(batch.id(), &movements), 20);
    }

    #[test]
    fn negative_report_windows_are_rejected() {
        let (svc, _) = service();
        assert_eq!(svc.get_expiring_stock(-1).unwrap_err().code(), "validation_error");
        assert_eq!(
            svc.get_audit_trail(None, None, -1).unwrap_err().code(),
            "validation_error"
        );
    }

    #[test]
    fn huge_report_windows_cover_everything() {
        let (svc, clock) = service();
        let (p, w) = (ProductId::new(), WarehouseId::new());

        let mut receipt = ReceiveBatch::new(p, w, "R-4", 8);
        receipt.expiry_date = Some(start() + Duration::days(3650));
        svc.add_stock(AddStock::new(receipt), "receiver").unwrap();
        clock.advance(Duration::days(400));

        let expiring = svc.get_expiring_stock(i64::MAX).unwrap();
        assert_eq!(expiring.len(), 1);

        let trail = svc.get_audit_trail(Some(p), Some(w), i64::MAX).unwrap();
        assert_eq!(trail.len(), 1);
    }
}
