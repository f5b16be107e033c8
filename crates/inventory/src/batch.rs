use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, DomainError, DomainResult, ProductId, VendorId, WarehouseId};

/// Product/warehouse pair: the unit of stock accounting and of mutual exclusion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockKey {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
}

impl StockKey {
    pub fn new(product_id: ProductId, warehouse_id: WarehouseId) -> Self {
        Self {
            product_id,
            warehouse_id,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product_id, self.warehouse_id)
    }
}

/// Parameters of a stock receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveBatch {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    pub batch_number: String,
    pub quantity: i64,
    /// Unit cost in smallest currency unit (e.g. cents).
    #[serde(default)]
    pub cost_price: Option<i64>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manufactured_date: Option<DateTime<Utc>>,
    /// Defaults to the receipt time when absent.
    #[serde(default)]
    pub received_date: Option<DateTime<Utc>>,
}

impl ReceiveBatch {
    pub fn new(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        batch_number: impl Into<String>,
        quantity: i64,
    ) -> Self {
        Self {
            product_id,
            warehouse_id,
            vendor_id: None,
            batch_number: batch_number.into(),
            quantity,
            cost_price: None,
            expiry_date: None,
            manufactured_date: None,
            received_date: None,
        }
    }

    pub fn expiring(mut self, expiry_date: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn received(mut self, received_date: DateTime<Utc>) -> Self {
        self.received_date = Some(received_date);
        self
    }

    pub fn costing(mut self, cost_price: i64) -> Self {
        self.cost_price = Some(cost_price);
        self
    }

    pub fn from_vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("batch quantity must be positive"));
        }
        if self.batch_number.trim().is_empty() {
            return Err(DomainError::validation("batch number cannot be empty"));
        }
        if matches!(self.cost_price, Some(cost) if cost < 0) {
            return Err(DomainError::validation("cost price cannot be negative"));
        }
        if let (Some(made), Some(expires)) = (self.manufactured_date, self.expiry_date) {
            if made > expires {
                return Err(DomainError::validation(
                    "manufactured date cannot be after expiry date",
                ));
            }
        }
        Ok(())
    }
}

/// A receipt of stock for one product at one warehouse.
///
/// `remaining_quantity` only changes through [`Batch::set_remaining`], which
/// keeps it within `[0, quantity]`. Depleted batches stay around as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    id: BatchId,
    product_id: ProductId,
    warehouse_id: WarehouseId,
    vendor_id: Option<VendorId>,
    batch_number: String,
    quantity: i64,
    remaining_quantity: i64,
    cost_price: Option<i64>,
    expiry_date: Option<DateTime<Utc>>,
    manufactured_date: Option<DateTime<Utc>>,
    received_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Batch {
    /// Build a freshly received batch (`remaining_quantity == quantity`).
    pub fn receive(id: BatchId, params: ReceiveBatch, now: DateTime<Utc>) -> DomainResult<Self> {
        params.validate()?;
        Ok(Self {
            id,
            product_id: params.product_id,
            warehouse_id: params.warehouse_id,
            vendor_id: params.vendor_id,
            batch_number: params.batch_number.trim().to_string(),
            quantity: params.quantity,
            remaining_quantity: params.quantity,
            cost_price: params.cost_price,
            expiry_date: params.expiry_date,
            manufactured_date: params.manufactured_date,
            received_date: params.received_date.unwrap_or(now),
            created_at: now,
        })
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn batch_number(&self) -> &str {
        &self.batch_number
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn remaining_quantity(&self) -> i64 {
        self.remaining_quantity
    }

    pub fn cost_price(&self) -> Option<i64> {
        self.cost_price
    }

    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    pub fn manufactured_date(&self) -> Option<DateTime<Utc>> {
        self.manufactured_date
    }

    pub fn received_date(&self) -> DateTime<Utc> {
        self.received_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Value of the stock still on hand, if the batch was costed.
    pub fn stock_value(&self) -> Option<i64> {
        self.cost_price
            .map(|cost| self.remaining_quantity.saturating_mul(cost))
    }

    pub fn check_remaining(&self, new_quantity: i64) -> DomainResult<()> {
        if new_quantity < 0 {
            return Err(DomainError::invariant(format!(
                "remaining quantity of batch {} cannot go negative (requested {new_quantity})",
                self.id
            )));
        }
        if new_quantity > self.quantity {
            return Err(DomainError::invariant(format!(
                "remaining quantity of batch {} cannot exceed received quantity {} (requested {new_quantity})",
                self.id, self.quantity
            )));
        }
        Ok(())
    }

    pub fn set_remaining(&mut self, new_quantity: i64) -> DomainResult<()> {
        self.check_remaining(new_quantity)?;
        self.remaining_quantity = new_quantity;
        Ok(())
    }
}
