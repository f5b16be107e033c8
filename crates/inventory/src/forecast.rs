//! Read-only stock signals: days-until-stockout, expiry risk, stock levels.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, ProductId, WarehouseId};

use crate::batch::{Batch, StockKey};
use crate::movement::{MovementType, StockMovement};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Thresholds driving forecast classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPolicy {
    /// Trailing window used for the consumption rate.
    pub window_days: i64,
    pub critical_days: i64,
    pub warning_days: i64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            window_days: 30,
            critical_days: 7,
            warning_days: 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Good,
}

/// `now` shifted by `days`, clamped to the representable range.
pub fn offset_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Whole days until `expiry`, rounded up. Negative once expired.
pub fn days_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (expiry - now).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling for
    // negative values.
    if millis > 0 && millis % MILLIS_PER_DAY != 0 {
        millis / MILLIS_PER_DAY + 1
    } else {
        millis / MILLIS_PER_DAY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchForecast {
    pub batch_id: BatchId,
    pub batch_number: String,
    /// Remaining quantity.
    pub quantity: i64,
    pub expiry_date: Option<DateTime<Utc>>,
    pub days_to_expiry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub total_stock: i64,
    /// Units that left through `out` movements inside the window.
    pub consumed_in_window: i64,
    /// Effective rate after the 1 unit/day floor.
    pub daily_consumption_rate: f64,
    /// `None` means stock never runs out at the current rate.
    pub days_until_out: Option<i64>,
    pub status: StockStatus,
    pub batches: Vec<BatchForecast>,
}

impl ForecastEntry {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.warehouse_id)
    }
}

/// Daily rate for `consumed` units over `window_days`, floored at 1 unit/day
/// when nothing was consumed.
pub fn daily_rate(consumed: i64, window_days: i64) -> f64 {
    let rate = if window_days > 0 {
        consumed as f64 / window_days as f64
    } else {
        0.0
    };
    if rate == 0.0 { 1.0 } else { rate }
}

pub fn days_until_out(total_stock: i64, rate: f64) -> Option<i64> {
    if rate <= 0.0 || !rate.is_finite() {
        return None;
    }
    Some((total_stock as f64 / rate).ceil() as i64)
}

pub fn classify(
    days_until_out: Option<i64>,
    batches: &[BatchForecast],
    policy: &ForecastPolicy,
) -> StockStatus {
    let expiring_soon = batches
        .iter()
        .any(|b| matches!(b.days_to_expiry, Some(d) if d <= policy.critical_days));

    match days_until_out {
        Some(days) if days <= policy.critical_days => StockStatus::Critical,
        _ if expiring_soon => StockStatus::Critical,
        Some(days) if days <= policy.warning_days => StockStatus::Warning,
        _ => StockStatus::Good,
    }
}

/// One forecast entry per product/warehouse pair present in `batches`,
/// ordered by pair.
pub fn build_forecast(
    batches: &[Batch],
    movements: &[StockMovement],
    now: DateTime<Utc>,
    policy: &ForecastPolicy,
) -> Vec<ForecastEntry> {
    let window_start = offset_days(now, -policy.window_days.max(0));

    let mut consumed: BTreeMap<StockKey, i64> = BTreeMap::new();
    for m in movements {
        if m.movement_type == MovementType::Out && m.created_at >= window_start {
            let total = consumed.entry(m.key()).or_insert(0);
            *total = total.saturating_add(m.quantity_delta.saturating_abs());
        }
    }

    let mut grouped: BTreeMap<StockKey, Vec<&Batch>> = BTreeMap::new();
    for batch in batches {
        grouped.entry(batch.key()).or_default().push(batch);
    }

    grouped
        .into_iter()
        .map(|(key, group)| {
            let total_stock = group
                .iter()
                .fold(0i64, |sum, b| sum.saturating_add(b.remaining_quantity()));
            let consumed_in_window = consumed.get(&key).copied().unwrap_or(0);
            let rate = daily_rate(consumed_in_window, policy.window_days);
            let days_out = days_until_out(total_stock, rate);

            let mut breakdown: Vec<BatchForecast> = group
                .iter()
                .map(|b| BatchForecast {
                    batch_id: b.id(),
                    batch_number: b.batch_number().to_string(),
                    quantity: b.remaining_quantity(),
                    expiry_date: b.expiry_date(),
                    days_to_expiry: b.expiry_date().map(|e| days_to_expiry(e, now)),
                })
                .collect();
            breakdown.sort_by_key(|b| (b.days_to_expiry.is_none(), b.days_to_expiry));

            let status = classify(days_out, &breakdown, policy);

            ForecastEntry {
                product_id: key.product_id,
                warehouse_id: key.warehouse_id,
                total_stock,
                consumed_in_window,
                daily_consumption_rate: rate,
                days_until_out: days_out,
                status,
                batches: breakdown,
            }
        })
        .collect()
}

/// A batch flagged by the expiry report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringBatch {
    #[serde(flatten)]
    pub batch: Batch,
    pub days_to_expiry: i64,
}

/// Batches that still hold stock and expire within `within_days` of `now`
/// (already expired ones included), soonest first.
pub fn expiring_batches<'a>(
    batches: impl IntoIterator<Item = &'a Batch>,
    within_days: i64,
    now: DateTime<Utc>,
) -> Vec<ExpiringBatch> {
    let cutoff = offset_days(now, within_days);

    let mut expiring: Vec<ExpiringBatch> = batches
        .into_iter()
        .filter(|b| b.remaining_quantity() > 0)
        .filter_map(|b| {
            let expiry = b.expiry_date()?;
            (expiry <= cutoff).then(|| ExpiringBatch {
                batch: b.clone(),
                days_to_expiry: days_to_expiry(expiry, now),
            })
        })
        .collect();
    expiring.sort_by_key(|e| (e.days_to_expiry, e.batch.expiry_date()));
    expiring
}

/// Stock level per product/warehouse pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub total_stock: i64,
    pub batch_count: usize,
    /// Batches with remaining stock.
    pub active_batches: usize,
    /// Σ remaining × cost over costed batches (smallest currency unit).
    pub stock_value: i64,
    /// Remaining units in batches without a cost price.
    pub uncosted_quantity: i64,
}

pub fn summarize_stock<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Vec<StockSummary> {
    let mut by_key: BTreeMap<StockKey, StockSummary> = BTreeMap::new();

    for batch in batches {
        let key = batch.key();
        let summary = by_key.entry(key).or_insert_with(|| StockSummary {
            product_id: key.product_id,
            warehouse_id: key.warehouse_id,
            total_stock: 0,
            batch_count: 0,
            active_batches: 0,
            stock_value: 0,
            uncosted_quantity: 0,
        });

        summary.total_stock = summary.total_stock.saturating_add(batch.remaining_quantity());
        summary.batch_count += 1;
        if !batch.is_depleted() {
            summary.active_batches += 1;
        }
        match batch.stock_value() {
            Some(value) => summary.stock_value = summary.stock_value.saturating_add(value),
            None => {
                summary.uncosted_quantity =
                    summary.uncosted_quantity.saturating_add(batch.remaining_quantity())
            }
        }
    }

    by_key.into_values().collect()
}
