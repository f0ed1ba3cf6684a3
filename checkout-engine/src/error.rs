//! Engine error types

use shared::error::{CheckoutErrorCode, CheckoutFailure};
use thiserror::Error;

/// Checkout engine errors.
///
/// All validation is synchronous and happens before submission; no
/// error is auto-retried by the engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Insufficient funds: tendered {tendered:.2}, due {due:.2}")]
    InsufficientFunds { tendered: f64, due: f64 },

    #[error("Amount mismatch: expected {expected:.2}, got {actual:.2}")]
    AmountMismatch { expected: f64, actual: f64 },

    #[error("Sub-bill has no payment: {0}")]
    UnassignedSubBill(String),

    #[error("Line not assigned to any sub-bill: {0}")]
    UnassignedLine(String),

    #[error("A return reason is required")]
    MissingReason,

    #[error("Nothing selected for return")]
    EmptySelection,

    #[error("Invalid discount transition: {0}")]
    InvalidDiscountTransition(String),

    #[error("Line not found: {0}")]
    LineNotFound(String),

    #[error("Sub-bill not found: {0}")]
    SubBillNotFound(String),

    #[error("Order not completed: {0}")]
    OrderNotCompleted(String),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Submission already in flight for order {0}")]
    SubmissionInFlight(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<CheckoutError> for CheckoutFailure {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::InsufficientFunds { .. } => CheckoutErrorCode::InsufficientFunds,
            CheckoutError::AmountMismatch { .. } => CheckoutErrorCode::AmountMismatch,
            CheckoutError::UnassignedSubBill(_) => CheckoutErrorCode::UnassignedSubBill,
            CheckoutError::UnassignedLine(_) => CheckoutErrorCode::UnassignedLine,
            CheckoutError::MissingReason => CheckoutErrorCode::MissingReason,
            CheckoutError::EmptySelection => CheckoutErrorCode::EmptySelection,
            CheckoutError::InvalidDiscountTransition(_) => {
                CheckoutErrorCode::InvalidDiscountTransition
            }
            CheckoutError::LineNotFound(_) => CheckoutErrorCode::LineNotFound,
            CheckoutError::SubBillNotFound(_) => CheckoutErrorCode::SubBillNotFound,
            CheckoutError::OrderNotCompleted(_) => CheckoutErrorCode::OrderNotCompleted,
            CheckoutError::InvalidAmount => CheckoutErrorCode::InvalidAmount,
            CheckoutError::SubmissionInFlight(_) => CheckoutErrorCode::SubmissionInFlight,
            CheckoutError::InvalidOperation(_) => CheckoutErrorCode::InvalidOperation,
        };
        CheckoutFailure::new(code, err.to_string())
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;
