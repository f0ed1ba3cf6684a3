//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then
//! converted to `f64` for storage/serialization. Amounts are rounded
//! to the currency's minor unit (2 decimal places) at the boundary.

use crate::error::CheckoutError;
use rust_decimal::prelude::*;
use shared::order::PaymentRecord;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per line (€1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed payment amount (€1,000,000)
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> Result<(), CheckoutError> {
    if !value.is_finite() {
        return Err(CheckoutError::InvalidOperation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a price before it enters any calculation
pub fn validate_price(price: f64, field_name: &str) -> Result<(), CheckoutError> {
    require_finite(price, field_name)?;
    if price < 0.0 {
        return Err(CheckoutError::InvalidOperation(format!(
            "{} must be non-negative, got {}",
            field_name, price
        )));
    }
    if price > MAX_PRICE {
        return Err(CheckoutError::InvalidOperation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a payment amount before reconciliation
pub fn validate_payment_amount(amount: f64) -> Result<(), CheckoutError> {
    require_finite(amount, "payment amount")?;
    if amount <= 0.0 {
        return Err(CheckoutError::InvalidAmount);
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(CheckoutError::InvalidOperation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated via `require_finite()` at the
/// boundary. If NaN/Infinity somehow reaches here, logs an error and
/// returns ZERO to avoid silent data corruption.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp with max input ≤ 1_000_000 (validated at boundary)
        // is always within f64 representable range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Extract the tax component of a tax-inclusive amount.
///
/// Prices include tax, so the tax is derived rather than stored:
/// `tax = gross * rate / (1 + rate)` with a fractional rate
/// (0.20 = 20%). Returns an unrounded Decimal; callers round via
/// [`to_f64`] at the boundary.
pub fn extract_inclusive_tax(gross: Decimal, tax_rate: f64) -> Decimal {
    let rate = to_decimal(tax_rate);
    if rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    gross * rate / (Decimal::ONE + rate)
}

/// Sum payment amounts with precise arithmetic
pub fn sum_payments(payments: &[PaymentRecord]) -> Decimal {
    payments.iter().map(|p| to_decimal(p.amount)).sum()
}

/// Check if payment is sufficient (with small tolerance for edge cases)
///
/// Returns true if paid >= required - 0.01
pub fn is_payment_sufficient(paid: f64, required: f64) -> bool {
    to_decimal(paid) >= to_decimal(required) - MONEY_TOLERANCE
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

/// Bucket key for grouping tax rates: rates within 0.1 percentage
/// point of each other land in the same bucket (historically 10% and
/// 20%).
#[inline]
pub fn rate_bucket(tax_rate: f64) -> i64 {
    (tax_rate * 1000.0).round() as i64
}

/// The representative fractional rate of a bucket key.
#[inline]
pub fn bucket_rate(bucket: i64) -> f64 {
    bucket as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::PaymentMethod;

    #[test]
    fn test_inclusive_tax_extraction() {
        // 12.00 gross at 20% → 12 × 0.20 / 1.20 = 2.00
        let tax = extract_inclusive_tax(Decimal::from(12), 0.20);
        assert_eq!(to_f64(tax), 2.00);
    }

    #[test]
    fn test_inclusive_tax_ten_percent() {
        // 11.00 gross at 10% → 1.00
        let tax = extract_inclusive_tax(Decimal::from(11), 0.10);
        assert_eq!(to_f64(tax), 1.00);
    }

    #[test]
    fn test_inclusive_tax_rounds_at_boundary() {
        // 10.00 at 20% → 1.666... → 1.67
        let tax = extract_inclusive_tax(Decimal::from(10), 0.20);
        assert_eq!(to_f64(tax), 1.67);
    }

    #[test]
    fn test_zero_rate_no_tax() {
        let tax = extract_inclusive_tax(Decimal::from(10), 0.0);
        assert_eq!(tax, Decimal::ZERO);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(10.0, 10.0));
        assert!(money_eq(10.0, 10.005));
        assert!(!money_eq(10.0, 10.02));
    }

    #[test]
    fn test_is_payment_sufficient() {
        assert!(is_payment_sufficient(15.50, 15.50));
        assert!(is_payment_sufficient(20.00, 15.50));
        assert!(is_payment_sufficient(15.495, 15.50));
        assert!(!is_payment_sufficient(15.00, 15.50));
    }

    #[test]
    fn test_sum_payments() {
        let payments = vec![
            PaymentRecord::exact(PaymentMethod::Cash, 10.10),
            PaymentRecord::exact(PaymentMethod::Card, 5.25),
        ];
        assert_eq!(to_f64(sum_payments(&payments)), 15.35);
    }

    #[test]
    fn test_validate_price_rejects_nan() {
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(f64::INFINITY, "price").is_err());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(2_000_000.0, "price").is_err());
        assert!(validate_price(7.0, "price").is_ok());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(matches!(
            validate_payment_amount(0.0),
            Err(CheckoutError::InvalidAmount)
        ));
        assert!(matches!(
            validate_payment_amount(-5.0),
            Err(CheckoutError::InvalidAmount)
        ));
        assert!(validate_payment_amount(15.50).is_ok());
    }

    #[test]
    fn test_rate_bucket_groups_close_rates() {
        // Within 0.1 pp → same bucket
        assert_eq!(rate_bucket(0.20), rate_bucket(0.2001));
        assert_eq!(rate_bucket(0.10), rate_bucket(0.0999));
        // 10% and 20% are distinct buckets
        assert_ne!(rate_bucket(0.10), rate_bucket(0.20));
        assert_eq!(bucket_rate(rate_bucket(0.20)), 0.20);
    }
}
