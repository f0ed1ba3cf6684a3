//! Error codes shared with clients
//!
//! The engine reports failures as a code plus a human-readable
//! message; the presentation layer owns localization.

use serde::{Deserialize, Serialize};

/// Checkout error codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutErrorCode {
    /// Cash received is below the amount due
    InsufficientFunds,
    /// Split/dual-tender amounts do not sum to the total (0.01 tolerance)
    AmountMismatch,
    /// A sub-bill has no payment assigned
    UnassignedSubBill,
    /// Item-split checkout with a line assigned to no bill
    UnassignedLine,
    /// Return without a justification
    MissingReason,
    /// Partial return with nothing selected
    EmptySelection,
    /// Discount toggle on a line locked by a mutually exclusive state
    InvalidDiscountTransition,
    LineNotFound,
    SubBillNotFound,
    /// Return attempted on an order that is not completed
    OrderNotCompleted,
    InvalidAmount,
    /// A submission is already outstanding for this order
    SubmissionInFlight,
    InvalidOperation,
}

/// A checkout failure as surfaced to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CheckoutFailure {
    pub code: CheckoutErrorCode,
    pub message: String,
}

impl CheckoutFailure {
    pub fn new(code: CheckoutErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
