//! Checkout engine: pricing, splitting, payment reconciliation and
//! returns for a point-of-sale order.
//!
//! Everything is synchronous and re-derived from the in-memory order
//! state on every mutation. The engine validates before submission and
//! trusts the backend as the source of truth for final totals and
//! sequencing.

pub mod cart;
pub mod error;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod returns;
pub mod split;
pub mod submission;

pub use error::{CheckoutError, CheckoutResult};
pub use payment::{PaymentPlan, Reconciliation};
pub use returns::{ReturnMode, ReturnRequest};
pub use split::{SplitMode, SplitState};
pub use submission::SubmissionGuard;
