//! FEFO-then-FIFO batch ordering.

use core::cmp::Ordering;

use crate::batch::Batch;

/// Total order used to pick batches for consumption.
///
/// 1. Batches with an expiry date come before batches without one.
/// 2. Two expiring batches: earlier expiry first, then earlier received date.
/// 3. Two non-expiring batches: earlier received date first.
///
/// Anything still tied compares `Equal`; callers sort stably so arrival order
/// decides.
pub fn consumption_order(a: &Batch, b: &Batch) -> Ordering {
    match (a.expiry_date(), b.expiry_date()) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| a.received_date().cmp(&b.received_date())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.received_date().cmp(&b.received_date()),
    }
}

/// Batches that still hold stock, in consumption order.
pub fn eligible_in_order<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Vec<&'a Batch> {
    let mut eligible: Vec<&Batch> = batches
        .into_iter()
        .filter(|b| b.remaining_quantity() > 0)
        .collect();
    eligible.sort_by(|a, b| consumption_order(a, b));
    eligible
}
