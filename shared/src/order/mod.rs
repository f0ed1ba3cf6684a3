//! Order Types Module
//!
//! Types describing a draft/completed order, its lines and payments,
//! the sub-bills of a split checkout, reversal records and the
//! submission payloads sent to the fiscal backend.

pub mod reversal;
pub mod submission;
pub mod types;

// Re-exports
pub use reversal::{ReturnClassification, ReversalRecord};
pub use submission::{LineSubmission, OrderSubmission, PaymentMethodTag, SubBillPayment};
pub use types::*;
