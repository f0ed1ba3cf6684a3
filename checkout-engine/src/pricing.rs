//! Line Price Calculator
//!
//! Computes a line's effective unit price from the catalog base price
//! and the line's discount state. Pricing is a pure function: the
//! general happy-hour settings are passed in explicitly, never read
//! from ambient state.
//!
//! Uses rust_decimal for precision calculations.

use rust_decimal::prelude::*;

use crate::error::CheckoutError;
use crate::money::{extract_inclusive_tax, to_decimal, to_f64, validate_price};
use shared::models::{CatalogItem, DiscountMode, HappyHourContext, HappyHourDiscount};
use shared::order::DiscountState;

/// Result of a line price calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    /// Per-unit price after discounts, tax-inclusive
    pub unit_price: f64,
    /// Line total (quantity is fixed at 1)
    pub total_price: f64,
    /// Tax component extracted from the tax-inclusive total
    pub tax_amount: f64,
}

/// Compute the effective price of one line.
///
/// - `None`: catalog base price.
/// - `HappyHourAuto`/`HappyHourManual`: the item's own discount when it
///   carries a value, else the general fallback from `ctx`.
///   Percentage → `base * (1 - value)`; Fixed → `max(0, base - value)`.
/// - `Offert`/`Perso`: forced to zero. The caller preserves
///   `original_price` so the comp can be reverted.
pub fn price_line(
    item: &CatalogItem,
    state: DiscountState,
    ctx: &HappyHourContext,
) -> Result<PricedLine, CheckoutError> {
    validate_price(item.base_price, "base_price")?;

    let base = to_decimal(item.base_price);
    let unit = match state {
        DiscountState::None => base,
        DiscountState::HappyHourAuto | DiscountState::HappyHourManual => {
            apply_happy_hour(base, &item.effective_happy_hour_discount(ctx))
        }
        DiscountState::Offert | DiscountState::Perso => Decimal::ZERO,
    };

    let unit_price = to_f64(unit.max(Decimal::ZERO));
    let total = to_decimal(unit_price);
    let tax_amount = to_f64(extract_inclusive_tax(total, item.tax_rate));

    Ok(PricedLine {
        unit_price,
        total_price: unit_price,
        tax_amount,
    })
}

fn apply_happy_hour(base: Decimal, discount: &HappyHourDiscount) -> Decimal {
    let value = to_decimal(discount.value);
    match discount.mode {
        DiscountMode::Percentage => base * (Decimal::ONE - value),
        DiscountMode::Fixed => (base - value).max(Decimal::ZERO),
    }
}

/// Check that a discount transition is legal.
///
/// States are mutually exclusive: a comped line (Offert/Perso) cannot
/// take a happy-hour discount or the other comp classification. Such
/// toggles are rejected here, not silently corrected — the
/// interaction layer disables the controls based on this result.
pub fn validate_transition(
    current: DiscountState,
    requested: DiscountState,
) -> Result<(), CheckoutError> {
    if requested == DiscountState::None || current == requested {
        return Ok(());
    }
    if current.is_comp() {
        return Err(CheckoutError::InvalidDiscountTransition(format!(
            "line is locked by {:?}; clear it before applying {:?}",
            current, requested
        )));
    }
    Ok(())
}

/// Switch a discount definition between percentage and fixed mode.
///
/// Switching resets the value to 0 rather than attempting a
/// conversion between the two scales. This is an explicit policy, not
/// a bug; a 25% rate has no meaningful fixed-amount equivalent without
/// knowing the price it will apply to.
pub fn switch_discount_mode(discount: HappyHourDiscount, mode: DiscountMode) -> HappyHourDiscount {
    if discount.mode == mode {
        discount
    } else {
        HappyHourDiscount::reset(mode)
    }
}
