//! Inventory batch ledger domain.
//!
//! Batches, the append-only movement/adjustment records, the FEFO/FIFO
//! consumption order and the read-only forecast computations. Pure domain
//! logic: no IO, no storage, no clock (callers pass `now`).

pub mod adjustment;
pub mod audit;
pub mod batch;
pub mod consumption;
pub mod forecast;
pub mod movement;
pub mod ordering;
pub mod receipt;

pub use adjustment::{AdjustStock, AdjustmentType, StockAdjustment};
pub use audit::{AuditEntry, merge_audit_trail};
pub use batch::{Batch, ReceiveBatch, StockKey};
pub use consumption::{
    ConsumeStock, ConsumedBatch, ConsumptionPlan, ConsumptionResult, PlannedDraw, plan_consumption,
};
pub use forecast::{
    BatchForecast, ExpiringBatch, ForecastEntry, ForecastPolicy, StockStatus, StockSummary,
    build_forecast, days_to_expiry, expiring_batches, offset_days, summarize_stock,
};
pub use movement::{MovementType, NewMovement, StockMovement, reference_types, replay_remaining};
pub use ordering::{consumption_order, eligible_in_order};
pub use receipt::{AddStock, PurchaseOrderLine, ReceivePurchaseOrder};
