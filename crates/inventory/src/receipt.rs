//! Stock receipt commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, ProductId, VendorId, WarehouseId};

use crate::batch::ReceiveBatch;
use crate::movement::reference_types;

/// Command: receive a batch and log its `in` movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStock {
    #[serde(flatten)]
    pub batch: ReceiveBatch,
    /// Defaults to the new batch's id.
    #[serde(default)]
    pub reference: Option<String>,
    /// Defaults to `batch_creation`.
    #[serde(default)]
    pub reference_type: Option<String>,
}

impl AddStock {
    pub fn new(batch: ReceiveBatch) -> Self {
        Self {
            batch,
            reference: None,
            reference_type: None,
        }
    }

    pub fn referencing(mut self, reference: impl Into<String>, reference_type: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self.reference_type = Some(reference_type.into());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.batch.validate()
    }
}

/// One received line of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    pub product_id: ProductId,
    pub batch_number: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost: Option<i64>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manufactured_date: Option<DateTime<Utc>>,
}

/// Command: receive every line of a purchase order into one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivePurchaseOrder {
    pub purchase_order_id: String,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    pub lines: Vec<PurchaseOrderLine>,
}

impl ReceivePurchaseOrder {
    /// Expand into per-line `AddStock` commands, validating all of them first.
    pub fn into_receipts(self) -> DomainResult<Vec<AddStock>> {
        if self.purchase_order_id.trim().is_empty() {
            return Err(DomainError::validation("purchase order id cannot be empty"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("purchase order has no lines to receive"));
        }

        let receipts: Vec<AddStock> = self
            .lines
            .into_iter()
            .map(|line| {
                AddStock::new(ReceiveBatch {
                    product_id: line.product_id,
                    warehouse_id: self.warehouse_id,
                    vendor_id: self.vendor_id,
                    batch_number: line.batch_number,
                    quantity: line.quantity,
                    cost_price: line.unit_cost,
                    expiry_date: line.expiry_date,
                    manufactured_date: line.manufactured_date,
                    received_date: None,
                })
                .referencing(
                    self.purchase_order_id.clone(),
                    reference_types::PURCHASE_ORDER,
                )
            })
            .collect();

        for receipt in &receipts {
            receipt.validate()?;
        }
        Ok(receipts)
    }
}
