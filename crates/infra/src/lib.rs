//! Infrastructure layer: stores, locking, configuration and the ledger service.

pub mod config;
pub mod error;
pub mod gateway;
pub mod locks;
pub mod service;
pub mod store;

pub use config::{ConsumptionMode, LedgerConfig};
pub use error::{LedgerError, StoreError};
pub use gateway::{LedgerRequest, handle_json, handle_request};
pub use locks::KeyedLocks;
pub use service::{InMemoryInventoryService, InventoryService, LedgerResult};
pub use store::{
    AdjustmentLog, BatchFilter, BatchStore, InMemoryAdjustmentLog, InMemoryBatchStore,
    InMemoryMovementLog, LogFilter, MovementLog,
};
