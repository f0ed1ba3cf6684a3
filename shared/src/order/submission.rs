//! Submission payloads
//!
//! The wire shape sent to the fiscal backend's create-order endpoint.
//! Returns reuse the same shape with negated amounts and the reason
//! embedded in `notes`; the backend owns journaling and sequencing.

use serde::{Deserialize, Serialize};

use super::types::PaymentMethod;

/// Payment method tag on the order-level payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodTag {
    Cash,
    Card,
    /// Dual-tender or per-sub-bill payment; details in `sub_bills`
    Split,
}

/// One order line as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSubmission {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub happy_hour_applied: bool,
}

/// Per-sub-bill payment summary for split orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubBillPayment {
    pub payment_method: PaymentMethod,
    pub amount: f64,
}

/// Order (or reversal) submission payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSubmission {
    pub items: Vec<LineSubmission>,
    pub total_amount: f64,
    pub total_tax: f64,
    pub payment_method: PaymentMethodTag,
    pub tips: f64,
    pub change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_bills: Option<Vec<SubBillPayment>>,
}
