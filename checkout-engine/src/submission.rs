//! Submission in-flight guard
//!
//! No idempotency key is generated client-side, so a duplicate
//! submission would create a duplicate fiscal entry. The guard makes
//! re-submission impossible while a request is outstanding: the
//! interaction layer disables the action on `SubmissionInFlight`
//! instead of retrying.

use std::collections::HashSet;

use crate::error::{CheckoutError, CheckoutResult};

/// Tracks which orders have a submission outstanding.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: HashSet<String>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a submission as outstanding. Fails if one already is.
    pub fn begin(&mut self, order_id: &str) -> CheckoutResult<()> {
        if !self.in_flight.insert(order_id.to_string()) {
            tracing::warn!(order_id, "duplicate submission blocked");
            return Err(CheckoutError::SubmissionInFlight(order_id.to_string()));
        }
        tracing::debug!(order_id, "submission started");
        Ok(())
    }

    /// The backend accepted the submission.
    pub fn complete(&mut self, order_id: &str) {
        self.in_flight.remove(order_id);
        tracing::debug!(order_id, "submission completed");
    }

    /// The backend rejected the submission (or the request failed).
    /// Local state is untouched, so the operator can retry.
    pub fn fail(&mut self, order_id: &str) {
        self.in_flight.remove(order_id);
        tracing::debug!(order_id, "submission failed, retry allowed");
    }

    pub fn is_in_flight(&self, order_id: &str) -> bool {
        self.in_flight.contains(order_id)
    }
}
