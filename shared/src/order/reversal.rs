//! Return/reversal records
//!
//! A reversal is a new forward-only record that cancels all or part of
//! a completed order. The source order is never mutated; history stays
//! intact for audit.

use serde::{Deserialize, Serialize};

use super::types::TaxBucket;

/// What kind of reversal this record represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnClassification {
    /// Every line, the full tax breakdown, tip and transfer reversed
    Full,
    /// Only the selected lines (and optionally the tip)
    Partial,
    /// Source order had no items; only a tip is reversed
    TipReversal,
    /// Source order was a zero-item till transfer; its `change` is negated
    TillTransferReversal,
}

/// Computed reversal for a completed order. All monetary fields are
/// negations of the corresponding forward values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReversalRecord {
    pub id: String,
    pub source_order_id: String,
    pub classification: ReturnClassification,
    /// Instance ids of the reversed lines (empty for degenerate reversals)
    pub returned_lines: Vec<String>,
    pub tip_reversed: bool,
    /// Negative sum of reversed line totals
    pub total_amount: f64,
    /// Negative sum of reversed line tax
    pub tax_amount: f64,
    /// Negated per-rate buckets; never exceeds the source order's
    /// breakdown in absolute value
    pub tax_breakdown: Vec<TaxBucket>,
    /// Negated tip amount, 0.0 when the tip is not reversed
    pub tip_amount: f64,
    /// Negated till-transfer amount, 0.0 for item reversals
    pub change: f64,
    /// Structured justification, mandatory at creation time
    pub reason: String,
    pub created_at: i64,
}
