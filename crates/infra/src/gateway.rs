//! JSON operation gateway.
//!
//! Maps one request object (tagged by `"operation"`) onto one service call and
//! renders the outcome as `{"ok": true, "result": ...}` or
//! `{"ok": false, "error": code, "message": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use stockledger_core::{Clock, ProductId, WarehouseId};
use stockledger_inventory::{AddStock, AdjustStock, ConsumeStock, ReceivePurchaseOrder};

use crate::error::LedgerError;
use crate::service::{InventoryService, LedgerResult};
use crate::store::{AdjustmentLog, BatchStore, MovementLog};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LedgerRequest {
    AddStock {
        stock: AddStock,
        performed_by: String,
    },
    ReceivePurchaseOrder {
        order: ReceivePurchaseOrder,
        performed_by: String,
    },
    ConsumeStock(ConsumeStock),
    AdjustStock(AdjustStock),
    GetStockForecast {
        #[serde(default)]
        product_id: Option<ProductId>,
        #[serde(default)]
        warehouse_id: Option<WarehouseId>,
    },
    /// `withinDays` defaults to the configured expiry horizon.
    GetExpiringStock {
        #[serde(default)]
        within_days: Option<i64>,
    },
    /// `sinceDays` defaults to the configured audit lookback.
    GetAuditTrail {
        #[serde(default)]
        product_id: Option<ProductId>,
        #[serde(default)]
        warehouse_id: Option<WarehouseId>,
        #[serde(default)]
        since_days: Option<i64>,
    },
    GetStockSummary {
        #[serde(default)]
        product_id: Option<ProductId>,
        #[serde(default)]
        warehouse_id: Option<WarehouseId>,
    },
}

impl LedgerRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            LedgerRequest::AddStock { .. } => "addStock",
            LedgerRequest::ReceivePurchaseOrder { .. } => "receivePurchaseOrder",
            LedgerRequest::ConsumeStock(_) => "consumeStock",
            LedgerRequest::AdjustStock(_) => "adjustStock",
            LedgerRequest::GetStockForecast { .. } => "getStockForecast",
            LedgerRequest::GetExpiringStock { .. } => "getExpiringStock",
            LedgerRequest::GetAuditTrail { .. } => "getAuditTrail",
            LedgerRequest::GetStockSummary { .. } => "getStockSummary",
        }
    }
}

/// Execute one request against the service.
pub fn handle_request<B, M, A, C>(
    service: &InventoryService<B, M, A, C>,
    request: LedgerRequest,
) -> Value
where
    B: BatchStore,
    M: MovementLog,
    A: AdjustmentLog,
    C: Clock,
{
    let operation = request.operation();
    let outcome = match request {
        LedgerRequest::AddStock {
            stock,
            performed_by,
        } => service.add_stock(stock, &performed_by).map(to_value),
        LedgerRequest::ReceivePurchaseOrder {
            order,
            performed_by,
        } => service
            .receive_purchase_order(order, &performed_by)
            .map(to_value),
        LedgerRequest::ConsumeStock(command) => service.consume_stock(command).map(to_value),
        LedgerRequest::AdjustStock(command) => service.adjust_stock(command).map(to_value),
        LedgerRequest::GetStockForecast {
            product_id,
            warehouse_id,
        } => service
            .get_stock_forecast(product_id, warehouse_id)
            .map(to_value),
        LedgerRequest::GetExpiringStock { within_days } => service
            .get_expiring_stock(within_days.unwrap_or(service.config().expiring_within_days))
            .map(to_value),
        LedgerRequest::GetAuditTrail {
            product_id,
            warehouse_id,
            since_days,
        } => service
            .get_audit_trail(
                product_id,
                warehouse_id,
                since_days.unwrap_or(service.config().audit_days),
            )
            .map(to_value),
        LedgerRequest::GetStockSummary {
            product_id,
            warehouse_id,
        } => service
            .get_stock_summary(product_id, warehouse_id)
            .map(to_value),
    };

    respond(operation, outcome)
}

fn respond(operation: &'static str, outcome: LedgerResult<serde_json::Result<Value>>) -> Value {
    match outcome {
        Ok(Ok(result)) => json!({ "ok": true, "result": result }),
        Ok(Err(e)) => {
            tracing::error!(operation, error = %e, "failed to serialize result");
            json_error("internal_error", format!("failed to serialize result: {e}"))
        }
        Err(err) => {
            tracing::debug!(operation, code = err.code(), "request failed");
            error_body(&err)
        }
    }
}

/// Parse one JSON request and return the serialized response.
pub fn handle_json<B, M, A, C>(service: &InventoryService<B, M, A, C>, input: &str) -> String
where
    B: BatchStore,
    M: MovementLog,
    A: AdjustmentLog,
    C: Clock,
{
    let response = match serde_json::from_str::<LedgerRequest>(input) {
        Ok(request) => handle_request(service, request),
        Err(e) => json_error("bad_request", e.to_string()),
    };
    response.to_string()
}

pub fn error_body(err: &LedgerError) -> Value {
    let mut body = json_error(err.code(), err.to_string());
    if let (Some(shortfall), Some(map)) = (err.shortfall(), body.as_object_mut()) {
        map.insert("shortfall".to_string(), json!(shortfall));
    }
    body
}

pub fn json_error(code: &'static str, message: impl Into<String>) -> Value {
    json!({
        "ok": false,
        "error": code,
        "message": message.into(),
    })
}

fn to_value<T: Serialize>(value: T) -> serde_json::Result<Value> {
    serde_json::to_value(value)
}
