//! Cart mutations and order aggregation
//!
//! Every mutation re-derives the order's totals from the current line
//! set; there is no cached derived state that can go stale. Lines keep
//! their insertion order, which is also the display/print order.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{bucket_rate, extract_inclusive_tax, rate_bucket, to_decimal, to_f64};
use crate::pricing::{price_line, validate_transition};
use shared::models::{CatalogItem, HappyHourContext};
use shared::order::{DiscountState, Order, OrderLine, OrderTotals, TaxBucket};

/// Add one unit of a catalog item to the order.
///
/// Quantity is always 1: adding the same product again creates a new
/// line so each unit keeps independent discount control. Happy hour is
/// applied automatically when the context is active and the item is
/// eligible.
///
/// Returns the new line's instance id.
pub fn add_line(
    order: &mut Order,
    item: &CatalogItem,
    ctx: &HappyHourContext,
) -> CheckoutResult<String> {
    ensure_draft(order)?;

    let state = if ctx.is_active && item.is_happy_hour_eligible {
        DiscountState::HappyHourAuto
    } else {
        DiscountState::None
    };
    let priced = price_line(item, state, ctx)?;

    let line = OrderLine {
        instance_id: uuid::Uuid::new_v4().to_string(),
        product_id: item.id.clone(),
        product_name: item.name.clone(),
        quantity: 1,
        unit_price: priced.unit_price,
        total_price: priced.total_price,
        tax_rate: item.tax_rate,
        tax_amount: priced.tax_amount,
        original_price: (!state.is_none()).then_some(item.base_price),
        discount: state,
    };
    let instance_id = line.instance_id.clone();

    order.lines.push(line);
    recalculate_totals(order);
    Ok(instance_id)
}

/// Remove a line from the order.
pub fn remove_line(order: &mut Order, instance_id: &str) -> CheckoutResult<()> {
    ensure_draft(order)?;

    let before = order.lines.len();
    order.lines.retain(|l| l.instance_id != instance_id);
    if order.lines.len() == before {
        return Err(CheckoutError::LineNotFound(instance_id.to_string()));
    }
    recalculate_totals(order);
    Ok(())
}

/// Remove all lines (cart cleared or order abandoned).
pub fn clear_lines(order: &mut Order) -> CheckoutResult<()> {
    ensure_draft(order)?;
    order.lines.clear();
    recalculate_totals(order);
    Ok(())
}

/// Apply a discount state to a line.
///
/// `original_price` is captured lazily on the first discount
/// application, so a comp applied over a happy-hour price still
/// reverts to the pre-discount baseline. Transitions between mutually
/// exclusive states are rejected, never silently corrected.
pub fn apply_discount(
    order: &mut Order,
    instance_id: &str,
    requested: DiscountState,
    item: &CatalogItem,
    ctx: &HappyHourContext,
) -> CheckoutResult<()> {
    ensure_draft(order)?;

    if requested == DiscountState::None {
        return clear_discount(order, instance_id);
    }

    let line = order
        .line_mut(instance_id)
        .ok_or_else(|| CheckoutError::LineNotFound(instance_id.to_string()))?;
    validate_transition(line.discount, requested)?;

    if line.original_price.is_none() {
        line.original_price = Some(line.unit_price);
    }

    let priced = price_line(item, requested, ctx)?;
    let line = order
        .line_mut(instance_id)
        .ok_or_else(|| CheckoutError::LineNotFound(instance_id.to_string()))?;
    line.unit_price = priced.unit_price;
    line.total_price = priced.total_price;
    line.tax_amount = priced.tax_amount;
    line.discount = requested;

    recalculate_totals(order);
    Ok(())
}

/// Toggle a line's discount off, restoring the captured
/// `original_price` (or leaving the price untouched when none was
/// captured, i.e. the line never had a discount).
pub fn clear_discount(order: &mut Order, instance_id: &str) -> CheckoutResult<()> {
    ensure_draft(order)?;

    let line = order
        .line_mut(instance_id)
        .ok_or_else(|| CheckoutError::LineNotFound(instance_id.to_string()))?;

    if let Some(original) = line.original_price.take() {
        line.unit_price = original;
    }
    line.discount = DiscountState::None;

    recalculate_totals(order);
    Ok(())
}

/// Recalculate order totals from lines using precise decimal arithmetic.
///
/// Rewrites every line's `total_price`/`tax_amount` and the order's
/// subtotal, tax, per-rate breakdown and final amount. `final_amount`
/// always equals `subtotal`: discounts are already folded into line
/// prices and no order-level discount layer exists.
pub fn recalculate_totals(order: &mut Order) {
    let mut subtotal = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut buckets: BTreeMap<i64, Decimal> = BTreeMap::new();

    for line in &mut order.lines {
        let quantity = Decimal::from(line.quantity);
        let line_total = to_decimal(line.unit_price) * quantity;
        line.total_price = to_f64(line_total);

        let line_tax = extract_inclusive_tax(line_total, line.tax_rate);
        line.tax_amount = to_f64(line_tax);

        subtotal += line_total;
        total_tax += line_tax;
        *buckets.entry(rate_bucket(line.tax_rate)).or_default() += line_tax;
    }

    order.subtotal = to_f64(subtotal);
    order.tax_amount = to_f64(total_tax);
    order.final_amount = order.subtotal;
    order.tax_breakdown = buckets
        .into_iter()
        .map(|(bucket, amount)| TaxBucket {
            rate: bucket_rate(bucket),
            amount: to_f64(amount),
        })
        .collect();
}

/// The current aggregated amounts, as a standalone value.
pub fn totals(order: &Order) -> OrderTotals {
    OrderTotals {
        subtotal: order.subtotal,
        tax_amount: order.tax_amount,
        final_amount: order.final_amount,
        tax_breakdown: order.tax_breakdown.clone(),
    }
}

fn ensure_draft(order: &Order) -> CheckoutResult<()> {
    if !order.is_draft() {
        return Err(CheckoutError::InvalidOperation(format!(
            "order {} is not editable in status {:?}",
            order.id, order.status
        )));
    }
    Ok(())
}
