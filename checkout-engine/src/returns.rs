//! Return and reversal computation
//!
//! A return never mutates the source order. It produces a new
//! [`ReversalRecord`] whose monetary fields are negations of the
//! forward values, submitted as a forward-only entry so history stays
//! intact for audit.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{bucket_rate, rate_bucket, to_decimal, to_f64};
use shared::order::{
    LineSubmission, Order, OrderSubmission, PaymentMethod, PaymentMethodTag, ReturnClassification,
    ReversalRecord, TaxBucket,
};

/// What the operator asked to return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnMode {
    Full,
    Partial,
}

/// A return request against a completed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnRequest {
    pub mode: ReturnMode,
    /// Instance ids to reverse; ignored in full mode
    pub selected_lines: Vec<String>,
    /// Reverse the order-level tip; ignored in full mode (a full
    /// return always reverses the tip)
    pub reverse_tip: bool,
    pub reason: String,
}

impl ReturnRequest {
    pub fn full(reason: impl Into<String>) -> Self {
        Self {
            mode: ReturnMode::Full,
            selected_lines: Vec::new(),
            reverse_tip: false,
            reason: reason.into(),
        }
    }

    pub fn partial(selected_lines: Vec<String>, reverse_tip: bool, reason: impl Into<String>) -> Self {
        Self {
            mode: ReturnMode::Partial,
            selected_lines,
            reverse_tip,
            reason: reason.into(),
        }
    }
}

/// Compute the reversal for a completed order.
///
/// Zero-item orders (tip corrections, till transfers) are recognized
/// by their empty line set and classified specially: the reversed
/// amount is a direct negation of the tip/change field, and the
/// partial flag is irrelevant since there are no items to select.
pub fn compute_return(order: &Order, request: &ReturnRequest) -> CheckoutResult<ReversalRecord> {
    if !order.is_completed() {
        return Err(CheckoutError::OrderNotCompleted(order.id.clone()));
    }
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(CheckoutError::MissingReason);
    }

    if order.is_zero_item() {
        return degenerate_reversal(order, reason);
    }

    let (classification, lines, tip_reversed) = match request.mode {
        ReturnMode::Full => {
            let all: Vec<&_> = order.lines.iter().collect();
            (ReturnClassification::Full, all, order.tips != 0.0)
        }
        ReturnMode::Partial => {
            if request.selected_lines.is_empty() && !request.reverse_tip {
                return Err(CheckoutError::EmptySelection);
            }
            let mut selected = Vec::with_capacity(request.selected_lines.len());
            for id in &request.selected_lines {
                let line = order
                    .line(id)
                    .ok_or_else(|| CheckoutError::LineNotFound(id.clone()))?;
                selected.push(line);
            }
            (ReturnClassification::Partial, selected, request.reverse_tip)
        }
    };

    let mut total = Decimal::ZERO;
    let mut tax = Decimal::ZERO;
    let mut buckets: BTreeMap<i64, Decimal> = BTreeMap::new();
    for line in &lines {
        total += to_decimal(line.total_price);
        tax += to_decimal(line.tax_amount);
        *buckets.entry(rate_bucket(line.tax_rate)).or_default() += to_decimal(line.tax_amount);
    }

    let record = ReversalRecord {
        id: uuid::Uuid::new_v4().to_string(),
        source_order_id: order.id.clone(),
        classification,
        returned_lines: lines.iter().map(|l| l.instance_id.clone()).collect(),
        tip_reversed,
        total_amount: to_f64(-total),
        tax_amount: to_f64(-tax),
        tax_breakdown: buckets
            .into_iter()
            .map(|(bucket, amount)| TaxBucket {
                rate: bucket_rate(bucket),
                amount: to_f64(-amount),
            })
            .collect(),
        tip_amount: if tip_reversed {
            to_f64(-to_decimal(order.tips))
        } else {
            0.0
        },
        change: 0.0,
        reason: reason.to_string(),
        created_at: chrono::Utc::now().timestamp_millis(),
    };

    tracing::info!(
        source_order_id = %order.id,
        classification = ?record.classification,
        total = record.total_amount,
        "reversal computed"
    );
    Ok(record)
}

/// Tip-only / till-transfer-only reversal for a zero-item source
/// order. There is nothing to select, so both fields are fully
/// negated whatever the request mode was.
fn degenerate_reversal(order: &Order, reason: &str) -> CheckoutResult<ReversalRecord> {
    let classification = if order.change != 0.0 {
        ReturnClassification::TillTransferReversal
    } else if order.tips != 0.0 {
        ReturnClassification::TipReversal
    } else {
        return Err(CheckoutError::EmptySelection);
    };

    Ok(ReversalRecord {
        id: uuid::Uuid::new_v4().to_string(),
        source_order_id: order.id.clone(),
        classification,
        returned_lines: Vec::new(),
        tip_reversed: order.tips != 0.0,
        total_amount: 0.0,
        tax_amount: 0.0,
        tax_breakdown: Vec::new(),
        tip_amount: to_f64(-to_decimal(order.tips)),
        change: to_f64(-to_decimal(order.change)),
        reason: reason.to_string(),
        created_at: chrono::Utc::now().timestamp_millis(),
    })
}

/// Build the submission payload for a reversal: same wire shape as an
/// order, negated amounts, reason embedded in `notes`.
pub fn build_return_submission(order: &Order, record: &ReversalRecord) -> OrderSubmission {
    let items = record
        .returned_lines
        .iter()
        .filter_map(|id| order.line(id))
        .map(|line| LineSubmission {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: to_f64(-to_decimal(line.unit_price)),
            total_price: to_f64(-to_decimal(line.total_price)),
            tax_rate: line.tax_rate,
            tax_amount: to_f64(-to_decimal(line.tax_amount)),
            happy_hour_applied: line.discount.is_happy_hour(),
        })
        .collect();

    OrderSubmission {
        items,
        total_amount: record.total_amount,
        total_tax: record.tax_amount,
        payment_method: original_method_tag(order),
        tips: record.tip_amount,
        change: record.change,
        notes: Some(format!("RETURN: {}", record.reason)),
        sub_bills: None,
    }
}

/// The tag the source order was settled under, mirrored on the
/// reversal so the refund hits the same tender totals.
fn original_method_tag(order: &Order) -> PaymentMethodTag {
    match order.payments.as_slice() {
        [single] => match single.method {
            PaymentMethod::Cash => PaymentMethodTag::Cash,
            PaymentMethod::Card => PaymentMethodTag::Card,
        },
        [] => PaymentMethodTag::Cash,
        _ => PaymentMethodTag::Split,
    }
}
