//! Split checkout: sub-bill generation, payment assignment, validation
//!
//! A split is draft state living only for the duration of the checkout
//! dialog. Cancelling the dialog discards the whole [`SplitState`]
//! with no partial commit; nothing here touches the order itself.

mod equal;
mod item;

pub use equal::equal_split;
pub use item::{assign_line, item_split, unassign_line, validate_assignment};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{
    money_eq, require_finite, sum_payments, to_decimal, to_f64, validate_payment_amount,
};
use shared::order::{Order, PaymentMethod, PaymentRecord, SubBill};

/// How the order is being divided between payers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMode {
    /// Equal shares of the total; no line-to-payer tracking
    Equal,
    /// Lines individually assigned, each to exactly one bill
    Item,
}

/// Draft state of a split checkout dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitState {
    pub mode: SplitMode,
    pub bills: Vec<SubBill>,
}

impl SplitState {
    /// Start an equal split of the order total into `count` bills.
    pub fn equal(order: &Order, count: usize) -> CheckoutResult<Self> {
        Ok(Self {
            mode: SplitMode::Equal,
            bills: equal_split(order.final_amount, count)?,
        })
    }

    /// Start an item split: `count` empty bills awaiting assignment.
    pub fn item(count: usize) -> CheckoutResult<Self> {
        Ok(Self {
            mode: SplitMode::Item,
            bills: item_split(count)?,
        })
    }

    pub fn bill(&self, bill_id: &str) -> CheckoutResult<&SubBill> {
        self.bills
            .iter()
            .find(|b| b.id == bill_id)
            .ok_or_else(|| CheckoutError::SubBillNotFound(bill_id.to_string()))
    }

    pub fn bill_mut(&mut self, bill_id: &str) -> CheckoutResult<&mut SubBill> {
        self.bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or_else(|| CheckoutError::SubBillNotFound(bill_id.to_string()))
    }

    /// Sum of per-bill tips, for the order-level tip at submission.
    pub fn total_tips(&self) -> f64 {
        let sum: Decimal = self
            .bills
            .iter()
            .filter_map(|b| b.tip)
            .map(to_decimal)
            .sum();
        to_f64(sum)
    }
}

/// Select a single tender for a bill: one exact payment of the bill
/// total, replacing whatever was set before.
pub fn set_payment_method(
    state: &mut SplitState,
    bill_id: &str,
    method: PaymentMethod,
) -> CheckoutResult<()> {
    let bill = state.bill_mut(bill_id)?;
    bill.payments = vec![PaymentRecord::exact(method, bill.total)];
    Ok(())
}

/// Select cash+card for a bill, defaulting to a 50/50 division of the
/// bill total. Either amount can then be adjusted via
/// [`set_dual_cash_amount`].
pub fn set_dual_tender(state: &mut SplitState, bill_id: &str) -> CheckoutResult<()> {
    let bill = state.bill_mut(bill_id)?;
    let total = to_decimal(bill.total);
    let half = to_f64(total / Decimal::TWO);
    let card = to_f64(total - to_decimal(half));
    bill.payments = vec![
        PaymentRecord::exact(PaymentMethod::Cash, half),
        PaymentRecord::exact(PaymentMethod::Card, card),
    ];
    Ok(())
}

/// Adjust the cash component of a dual-tender bill. The card component
/// is derived, never edited independently: `card = total - cash`.
/// Either end of the range is allowed, so the pair can collapse to
/// all-cash or all-card.
pub fn set_dual_cash_amount(
    state: &mut SplitState,
    bill_id: &str,
    cash: f64,
) -> CheckoutResult<()> {
    let bill = state.bill_mut(bill_id)?;
    if bill.payments.len() != 2 {
        return Err(CheckoutError::InvalidOperation(format!(
            "sub-bill {} is not in cash+card mode",
            bill_id
        )));
    }
    require_finite(cash, "cash")?;
    if cash < 0.0 {
        return Err(CheckoutError::InvalidAmount);
    }
    let card = to_f64(to_decimal(bill.total) - to_decimal(cash));
    if card < 0.0 {
        return Err(CheckoutError::AmountMismatch {
            expected: bill.total,
            actual: cash,
        });
    }
    bill.payments = vec![
        PaymentRecord::exact(PaymentMethod::Cash, cash),
        PaymentRecord::exact(PaymentMethod::Card, card),
    ];
    Ok(())
}

/// Record or clear a per-bill tip.
pub fn set_tip(state: &mut SplitState, bill_id: &str, tip: Option<f64>) -> CheckoutResult<()> {
    if let Some(amount) = tip {
        validate_payment_amount(amount)?;
    }
    let bill = state.bill_mut(bill_id)?;
    bill.tip = tip;
    Ok(())
}

/// Validate the whole split before submission.
///
/// Every bill must have a payment, each bill's payments must cover its
/// own total, and the bill totals must sum to the order total within
/// the money tolerance. Failures are reported, never silently
/// corrected.
pub fn validate_bills(state: &SplitState, order: &Order) -> CheckoutResult<()> {
    if state.mode == SplitMode::Item {
        validate_assignment(state, order)?;
    }

    let mut grand_total = Decimal::ZERO;
    for bill in &state.bills {
        // A non-positive bill total can never be settled
        if bill.total <= 0.0 {
            return Err(CheckoutError::InvalidAmount);
        }
        if !bill.has_payment() {
            return Err(CheckoutError::UnassignedSubBill(bill.id.clone()));
        }
        let paid = to_f64(sum_payments(&bill.payments));
        if !money_eq(paid, bill.total) {
            return Err(CheckoutError::AmountMismatch {
                expected: bill.total,
                actual: paid,
            });
        }
        grand_total += to_decimal(bill.total);
    }

    let grand_total = to_f64(grand_total);
    if !money_eq(grand_total, order.final_amount) {
        return Err(CheckoutError::AmountMismatch {
            expected: order.final_amount,
            actual: grand_total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderLine;

    fn line(instance_id: &str, price: f64) -> OrderLine {
        OrderLine {
            instance_id: instance_id.to_string(),
            product_id: "product:1".to_string(),
            product_name: "Pinte".to_string(),
            quantity: 1,
            unit_price: price,
            total_price: price,
            tax_rate: 0.20,
            tax_amount: 0.0,
            original_price: None,
            discount: Default::default(),
        }
    }

    fn order_with_total(total: f64) -> Order {
        let mut order = Order::new();
        order.subtotal = total;
        order.final_amount = total;
        order
    }

    #[test]
    fn test_equal_split_bills_sum_to_total() {
        let order = order_with_total(31.0);
        let state = SplitState::equal(&order, 3).unwrap();

        assert_eq!(state.bills.len(), 3);
        assert_eq!(state.bills[0].total, 10.33);
        assert_eq!(state.bills[1].total, 10.33);
        // Last bill absorbs the rounding remainder
        assert_eq!(state.bills[2].total, 10.34);
        let sum: f64 = state.bills.iter().map(|b| b.total).sum();
        assert!((sum - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_requires_payment_on_every_bill() {
        let order = order_with_total(30.0);
        let mut state = SplitState::equal(&order, 2).unwrap();
        let first = state.bills[0].id.clone();
        set_payment_method(&mut state, &first, PaymentMethod::Card).unwrap();

        let err = validate_bills(&state, &order).unwrap_err();
        assert!(matches!(err, CheckoutError::UnassignedSubBill(_)));

        let second = state.bills[1].id.clone();
        set_payment_method(&mut state, &second, PaymentMethod::Cash).unwrap();
        assert!(validate_bills(&state, &order).is_ok());
    }

    #[test]
    fn test_item_split_requires_full_assignment() {
        let mut order = order_with_total(25.0);
        order.lines.push(line("line-1", 10.0));
        order.lines.push(line("line-2", 15.0));

        let mut state = SplitState::item(2).unwrap();
        let first = state.bills[0].id.clone();
        assign_line(&mut state, &first, &order, "line-1").unwrap();
        set_payment_method(&mut state, &first, PaymentMethod::Card).unwrap();

        let err = validate_bills(&state, &order).unwrap_err();
        assert!(matches!(err, CheckoutError::UnassignedLine(id) if id == "line-2"));
    }

    #[test]
    fn test_assignment_recomputes_bill_total() {
        let mut order = order_with_total(25.0);
        order.lines.push(line("line-1", 10.0));
        order.lines.push(line("line-2", 15.0));

        let mut state = SplitState::item(2).unwrap();
        let first = state.bills[0].id.clone();
        assign_line(&mut state, &first, &order, "line-1").unwrap();
        assign_line(&mut state, &first, &order, "line-2").unwrap();
        assert_eq!(state.bill(&first).unwrap().total, 25.0);

        unassign_line(&mut state, &order, "line-1").unwrap();
        assert_eq!(state.bill(&first).unwrap().total, 15.0);
    }

    #[test]
    fn test_reassignment_moves_line_between_bills() {
        let mut order = order_with_total(10.0);
        order.lines.push(line("line-1", 10.0));

        let mut state = SplitState::item(2).unwrap();
        let first = state.bills[0].id.clone();
        let second = state.bills[1].id.clone();
        assign_line(&mut state, &first, &order, "line-1").unwrap();
        assign_line(&mut state, &second, &order, "line-1").unwrap();

        assert_eq!(state.bill(&first).unwrap().total, 0.0);
        assert!(state.bill(&first).unwrap().assigned_lines.is_empty());
        assert_eq!(state.bill(&second).unwrap().total, 10.0);
    }

    #[test]
    fn test_dual_tender_defaults_to_half_and_half() {
        let order = order_with_total(15.5);
        let mut state = SplitState::equal(&order, 1).unwrap();
        let bill_id = state.bills[0].id.clone();
        set_dual_tender(&mut state, &bill_id).unwrap();

        let bill = state.bill(&bill_id).unwrap();
        assert_eq!(bill.payments.len(), 2);
        assert_eq!(bill.payments[0].method, PaymentMethod::Cash);
        assert_eq!(bill.payments[0].amount, 7.75);
        assert_eq!(bill.payments[1].method, PaymentMethod::Card);
        assert_eq!(bill.payments[1].amount, 7.75);
    }

    #[test]
    fn test_dual_tender_card_is_derived_from_cash() {
        let order = order_with_total(20.0);
        let mut state = SplitState::equal(&order, 1).unwrap();
        let bill_id = state.bills[0].id.clone();
        set_dual_tender(&mut state, &bill_id).unwrap();
        set_dual_cash_amount(&mut state, &bill_id, 12.5).unwrap();

        let bill = state.bill(&bill_id).unwrap();
        assert_eq!(bill.payments[0].amount, 12.5);
        assert_eq!(bill.payments[1].amount, 7.5);

        // Cash beyond the bill total cannot be reconciled
        let err = set_dual_cash_amount(&mut state, &bill_id, 25.0).unwrap_err();
        assert!(matches!(err, CheckoutError::AmountMismatch { .. }));
    }

    #[test]
    fn test_dual_tender_collapses_to_single_tender() {
        let order = order_with_total(20.0);
        let mut state = SplitState::equal(&order, 1).unwrap();
        let bill_id = state.bills[0].id.clone();
        set_dual_tender(&mut state, &bill_id).unwrap();

        // All-card: cash edited down to zero
        set_dual_cash_amount(&mut state, &bill_id, 0.0).unwrap();
        let bill = state.bill(&bill_id).unwrap();
        assert_eq!(bill.payments[0].amount, 0.0);
        assert_eq!(bill.payments[1].amount, 20.0);
        assert!(validate_bills(&state, &order).is_ok());

        // All-cash: card becomes the derived zero
        set_dual_cash_amount(&mut state, &bill_id, 20.0).unwrap();
        let bill = state.bill(&bill_id).unwrap();
        assert_eq!(bill.payments[0].amount, 20.0);
        assert_eq!(bill.payments[1].amount, 0.0);

        assert!(matches!(
            set_dual_cash_amount(&mut state, &bill_id, -1.0),
            Err(CheckoutError::InvalidAmount)
        ));
    }

    #[test]
    fn test_negative_bill_never_validates() {
        let order = order_with_total(30.0);
        let mut state = SplitState::equal(&order, 2).unwrap();
        for id in state.bills.iter().map(|b| b.id.clone()).collect::<Vec<_>>() {
            set_payment_method(&mut state, &id, PaymentMethod::Card).unwrap();
        }
        // Force a corrupt bill the way a bad generator would
        state.bills[1].total = -0.04;
        state.bills[1].payments[0].amount = -0.04;
        state.bills[0].total = 30.04;
        state.bills[0].payments[0].amount = 30.04;

        let err = validate_bills(&state, &order).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAmount));
    }

    #[test]
    fn test_tips_sum_across_bills() {
        let order = order_with_total(30.0);
        let mut state = SplitState::equal(&order, 3).unwrap();
        let a = state.bills[0].id.clone();
        let c = state.bills[2].id.clone();
        set_tip(&mut state, &a, Some(1.5)).unwrap();
        set_tip(&mut state, &c, Some(2.0)).unwrap();

        assert_eq!(state.total_tips(), 3.5);

        set_tip(&mut state, &c, None).unwrap();
        assert_eq!(state.total_tips(), 1.5);
    }

    #[test]
    fn test_split_state_serializes_for_dialog_restore() {
        let order = order_with_total(20.0);
        let state = SplitState::equal(&order, 2).unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"], "EQUAL");
        let restored: SplitState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_underpaid_bill_is_a_mismatch() {
        let order = order_with_total(30.0);
        let mut state = SplitState::equal(&order, 2).unwrap();
        for id in state.bills.iter().map(|b| b.id.clone()).collect::<Vec<_>>() {
            set_payment_method(&mut state, &id, PaymentMethod::Card).unwrap();
        }
        // Tamper with one payment amount
        state.bills[0].payments[0].amount = 10.0;

        let err = validate_bills(&state, &order).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::AmountMismatch {
                expected,
                actual,
            } if expected == 15.0 && actual == 10.0
        ));
    }
}
