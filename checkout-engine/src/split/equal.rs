//! Equal-share split

use rust_decimal::Decimal;

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{to_decimal, to_f64};
use shared::order::SubBill;

/// Divide a total into `count` equal shares.
///
/// Each share is rounded to the minor unit; the last bill pays the
/// exact remaining amount so the shares always sum to the total. Equal
/// split does not track which physical items belong to which payer, so
/// the bills carry no line assignments.
pub fn equal_split(total: f64, count: usize) -> CheckoutResult<Vec<SubBill>> {
    if count == 0 {
        return Err(CheckoutError::InvalidOperation(
            "split requires at least one sub-bill".to_string(),
        ));
    }

    let total = to_decimal(total);
    if total <= Decimal::ZERO {
        return Err(CheckoutError::InvalidAmount);
    }

    let share = to_f64(total / Decimal::from(count as u64));
    // A tiny total over many payers can round the share up past the
    // total, which would leave the last bill non-positive
    let last = total - to_decimal(share) * Decimal::from(count as u64 - 1);
    if last <= Decimal::ZERO {
        return Err(CheckoutError::InvalidAmount);
    }

    let mut bills = Vec::with_capacity(count);
    for _ in 0..count - 1 {
        bills.push(SubBill::new(share));
    }
    bills.push(SubBill::new(to_f64(last)));
    Ok(bills)
}
