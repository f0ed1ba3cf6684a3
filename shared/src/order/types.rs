//! Core order types: lines, discount state, payments, sub-bills

use serde::{Deserialize, Serialize};

/// Mutually exclusive discount state of an order line.
///
/// A line carries exactly one of these at a time; the engine rejects
/// transitions between incompatible states instead of silently
/// correcting them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountState {
    #[default]
    None,
    /// Happy hour applied automatically (item eligible, context active)
    HappyHourAuto,
    /// Happy hour forced by the operator
    HappyHourManual,
    /// Complimentary item offered to the customer
    Offert,
    /// Staff/personal-use item, free but recorded separately
    Perso,
}

impl DiscountState {
    pub fn is_none(&self) -> bool {
        matches!(self, DiscountState::None)
    }

    pub fn is_happy_hour(&self) -> bool {
        matches!(
            self,
            DiscountState::HappyHourAuto | DiscountState::HappyHourManual
        )
    }

    /// Offert and Perso both force the price to zero.
    pub fn is_comp(&self) -> bool {
        matches!(self, DiscountState::Offert | DiscountState::Perso)
    }
}

/// One unit of a catalog item in an order.
///
/// Quantity is fixed at 1: adding the same product twice creates two
/// lines so each unit keeps independent discount control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Unique line id within the order
    pub instance_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    /// Per-unit price after discounts, tax-inclusive
    pub unit_price: f64,
    /// Line total; equals `unit_price` with quantity fixed at 1
    pub total_price: f64,
    /// Fractional tax rate (0.20 = 20%)
    pub tax_rate: f64,
    /// Tax component extracted from the tax-inclusive total
    pub tax_amount: f64,
    /// Price active before the first discount was applied; captured
    /// lazily so reverting restores the immediately preceding price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub discount: DiscountState,
}

/// Tax bucketed by rate for the fiscal breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxBucket {
    /// Fractional rate the bucket groups (rates within 0.1 pp share a bucket)
    pub rate: f64,
    pub amount: f64,
}

/// Aggregated order-level amounts, recomputed from the line set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    /// Always equals `subtotal`: discounts are folded into line prices,
    /// there is no further order-level discount layer
    pub final_amount: f64,
    pub tax_breakdown: Vec<TaxBucket>,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Draft,
    Completed,
    Voided,
}

/// Tender method of a single payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

/// A payment applied to an order or a sub-bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub method: PaymentMethod,
    pub amount: f64,
    /// Cash only: amount the customer handed over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
    /// Cash only: change returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

impl PaymentRecord {
    pub fn exact(method: PaymentMethod, amount: f64) -> Self {
        Self {
            method,
            amount,
            tendered: None,
            change: None,
        }
    }
}

/// One payer's share of a split order.
///
/// Lives only for the duration of the checkout dialog; discarded on
/// cancel or after successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubBill {
    pub id: String,
    /// Line instance ids assigned to this bill (empty in equal-split mode)
    pub assigned_lines: Vec<String>,
    pub total: f64,
    pub payments: Vec<PaymentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<f64>,
}

impl SubBill {
    pub fn new(total: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            assigned_lines: Vec::new(),
            total,
            payments: Vec::new(),
            tip: None,
        }
    }

    pub fn has_payment(&self) -> bool {
        !self.payments.is_empty()
    }
}

/// An order: ordered line set plus computed totals.
///
/// Insertion order of `lines` is the display/print order. Computed
/// fields are rewritten by the engine on every mutation, never edited
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub tax_breakdown: Vec<TaxBucket>,
    pub payments: Vec<PaymentRecord>,
    /// Aggregate tip recorded at completion
    pub tips: f64,
    /// Cash change for a completed sale, or the transfer amount of a
    /// zero-item till-balancing order (signed: drawer→terminal or back)
    pub change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Order {
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: OrderStatus::Draft,
            lines: Vec::new(),
            subtotal: 0.0,
            tax_amount: 0.0,
            final_amount: 0.0,
            tax_breakdown: Vec::new(),
            payments: Vec::new(),
            tips: 0.0,
            change: 0.0,
            notes: None,
            created_at: now,
            completed_at: None,
        }
    }

    /// A zero-item till-balancing order: no lines, zero total, a
    /// nonzero `change` moving value between cash drawer and card
    /// terminal. Goes through the same submission path as a sale.
    pub fn till_transfer(amount: f64) -> Self {
        let mut order = Self::new();
        order.change = amount;
        order
    }

    pub fn is_draft(&self) -> bool {
        self.status == OrderStatus::Draft
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Degenerate orders (till transfers, tip corrections) have no
    /// lines and a zero total but still carry value in `tips`/`change`.
    pub fn is_zero_item(&self) -> bool {
        self.lines.is_empty() && self.final_amount == 0.0
    }

    pub fn line(&self, instance_id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.instance_id == instance_id)
    }

    pub fn line_mut(&mut self, instance_id: &str) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.instance_id == instance_id)
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_state_classification() {
        assert!(DiscountState::None.is_none());
        assert!(DiscountState::HappyHourAuto.is_happy_hour());
        assert!(DiscountState::HappyHourManual.is_happy_hour());
        assert!(DiscountState::Offert.is_comp());
        assert!(DiscountState::Perso.is_comp());
        assert!(!DiscountState::Offert.is_happy_hour());
    }

    #[test]
    fn test_till_transfer_is_zero_item() {
        let order = Order::till_transfer(50.0);
        assert!(order.is_zero_item());
        assert_eq!(order.change, 50.0);
        assert_eq!(order.final_amount, 0.0);
        assert!(order.lines.is_empty());
    }

    #[test]
    fn test_payment_method_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Cash).unwrap();
        assert_eq!(json, "\"cash\"");
        let json = serde_json::to_string(&PaymentMethod::Card).unwrap();
        assert_eq!(json, "\"card\"");
    }
}
