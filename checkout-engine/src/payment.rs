//! Payment reconciliation and order finalization
//!
//! A payment plan is validated against the order total before anything
//! is written back to the order. Reconciliation failures are reported
//! to the operator, never silently corrected; submission never happens
//! with an unbalanced plan.

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{
    is_payment_sufficient, money_eq, require_finite, to_decimal, to_f64, validate_payment_amount,
};
use crate::split::{validate_bills, SplitState};
use shared::order::{
    LineSubmission, Order, OrderStatus, OrderSubmission, PaymentMethod, PaymentMethodTag,
    PaymentRecord, SubBillPayment,
};

/// The operator's proposed way of settling an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPlan {
    /// Cash handed over; must cover the total, change is returned
    Cash { tendered: f64 },
    /// Card charge, implicitly exact
    Card,
    /// Exact allocation across both tenders; not an over-payment, so
    /// no change is produced
    CashAndCard { cash: f64, card: f64 },
    /// Per-sub-bill settlement of a split checkout
    Split(SplitState),
}

/// A validated payment, ready to finalize the order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reconciliation {
    pub method: PaymentMethodTag,
    pub records: Vec<PaymentRecord>,
    /// Cash change owed to the customer
    pub change: f64,
    /// Aggregate tip (per-bill tips plus any order-level tip)
    pub tips: f64,
    pub sub_bills: Option<Vec<SubBillPayment>>,
}

/// Validate a payment plan against the order's due amount.
///
/// `tip` is an optional order-level tip recorded on top of the total;
/// for split plans the per-bill tips are added to it.
pub fn reconcile(
    order: &Order,
    plan: &PaymentPlan,
    tip: Option<f64>,
) -> CheckoutResult<Reconciliation> {
    if !order.is_draft() {
        return Err(CheckoutError::InvalidOperation(format!(
            "order {} is not payable in status {:?}",
            order.id, order.status
        )));
    }
    if let Some(amount) = tip {
        validate_payment_amount(amount)?;
    }
    let due = order.final_amount;
    let mut tips = tip.unwrap_or(0.0);

    let reconciliation = match plan {
        PaymentPlan::Cash { tendered } => {
            require_finite(*tendered, "tendered")?;
            if *tendered < 0.0 {
                return Err(CheckoutError::InvalidAmount);
            }
            if !is_payment_sufficient(*tendered, due) {
                return Err(CheckoutError::InsufficientFunds {
                    tendered: *tendered,
                    due,
                });
            }
            let change = to_f64(to_decimal(*tendered) - to_decimal(due));
            Reconciliation {
                method: PaymentMethodTag::Cash,
                records: vec![PaymentRecord {
                    method: PaymentMethod::Cash,
                    amount: due,
                    tendered: Some(*tendered),
                    change: Some(change),
                }],
                change,
                tips,
                sub_bills: None,
            }
        }
        PaymentPlan::Card => Reconciliation {
            method: PaymentMethodTag::Card,
            records: vec![PaymentRecord::exact(PaymentMethod::Card, due)],
            change: 0.0,
            tips,
            sub_bills: None,
        },
        PaymentPlan::CashAndCard { cash, card } => {
            validate_payment_amount(*cash)?;
            validate_payment_amount(*card)?;
            let sum = to_f64(to_decimal(*cash) + to_decimal(*card));
            if !money_eq(sum, due) {
                return Err(CheckoutError::AmountMismatch {
                    expected: due,
                    actual: sum,
                });
            }
            Reconciliation {
                method: PaymentMethodTag::Split,
                records: vec![
                    PaymentRecord::exact(PaymentMethod::Cash, *cash),
                    PaymentRecord::exact(PaymentMethod::Card, *card),
                ],
                change: 0.0,
                tips,
                sub_bills: None,
            }
        }
        PaymentPlan::Split(state) => {
            validate_bills(state, order)?;
            tips = to_f64(to_decimal(tips) + to_decimal(state.total_tips()));
            let records: Vec<PaymentRecord> = state
                .bills
                .iter()
                .flat_map(|b| b.payments.iter().cloned())
                .collect();
            let sub_bills = records
                .iter()
                .map(|p| SubBillPayment {
                    payment_method: p.method,
                    amount: p.amount,
                })
                .collect();
            Reconciliation {
                method: PaymentMethodTag::Split,
                records,
                change: 0.0,
                tips,
                sub_bills: Some(sub_bills),
            }
        }
    };

    tracing::debug!(
        order_id = %order.id,
        method = ?reconciliation.method,
        due,
        change = reconciliation.change,
        "payment reconciled"
    );
    Ok(reconciliation)
}

/// Finalize the order with a validated payment.
///
/// `order.change` is added to, not overwritten: a zero-item till
/// transfer carries its transfer amount there and flows through the
/// same completion path as a sale.
pub fn complete_order(order: &mut Order, reconciliation: &Reconciliation) -> CheckoutResult<()> {
    if !order.is_draft() {
        return Err(CheckoutError::InvalidOperation(format!(
            "order {} is not payable in status {:?}",
            order.id, order.status
        )));
    }
    order.status = OrderStatus::Completed;
    order.payments = reconciliation.records.clone();
    order.tips = reconciliation.tips;
    order.change = to_f64(to_decimal(order.change) + to_decimal(reconciliation.change));
    order.completed_at = Some(chrono::Utc::now().timestamp_millis());

    tracing::info!(
        order_id = %order.id,
        total = order.final_amount,
        tips = order.tips,
        "order completed"
    );
    Ok(())
}

/// Build the submission payload for a completed order.
///
/// `reconciliation` carries the method tag and per-sub-bill records;
/// pass `None` for degenerate orders (till transfers) that never went
/// through a payment plan.
pub fn build_submission(
    order: &Order,
    reconciliation: Option<&Reconciliation>,
) -> CheckoutResult<OrderSubmission> {
    if !order.is_completed() {
        return Err(CheckoutError::OrderNotCompleted(order.id.clone()));
    }

    let items = order
        .lines
        .iter()
        .map(|line| LineSubmission {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
            tax_rate: line.tax_rate,
            tax_amount: line.tax_amount,
            happy_hour_applied: line.discount.is_happy_hour(),
        })
        .collect();

    Ok(OrderSubmission {
        items,
        total_amount: order.final_amount,
        total_tax: order.tax_amount,
        payment_method: reconciliation
            .map(|r| r.method)
            .unwrap_or(PaymentMethodTag::Cash),
        tips: order.tips,
        change: order.change,
        notes: order.notes.clone(),
        sub_bills: reconciliation.and_then(|r| r.sub_bills.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{set_payment_method, set_tip, SplitState};

    fn order_with_total(total: f64) -> Order {
        let mut order = Order::new();
        order.subtotal = total;
        order.final_amount = total;
        order
    }

    #[test]
    fn test_cash_payment_computes_change() {
        let order = order_with_total(15.5);
        let recon = reconcile(&order, &PaymentPlan::Cash { tendered: 20.0 }, None).unwrap();

        assert_eq!(recon.change, 4.5);
        assert_eq!(recon.method, PaymentMethodTag::Cash);
        assert_eq!(recon.records.len(), 1);
        assert_eq!(recon.records[0].amount, 15.5);
        assert_eq!(recon.records[0].tendered, Some(20.0));
        assert_eq!(recon.records[0].change, Some(4.5));
    }

    #[test]
    fn test_insufficient_cash_is_rejected() {
        let order = order_with_total(15.5);
        let err = reconcile(&order, &PaymentPlan::Cash { tendered: 15.0 }, None).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientFunds { tendered, due } if tendered == 15.0 && due == 15.5
        ));
    }

    #[test]
    fn test_card_is_exact_with_no_change() {
        let order = order_with_total(12.0);
        let recon = reconcile(&order, &PaymentPlan::Card, None).unwrap();
        assert_eq!(recon.change, 0.0);
        assert_eq!(recon.records[0].method, PaymentMethod::Card);
        assert_eq!(recon.records[0].amount, 12.0);
    }

    #[test]
    fn test_cash_and_card_must_sum_to_total() {
        let order = order_with_total(20.0);
        let recon = reconcile(
            &order,
            &PaymentPlan::CashAndCard {
                cash: 12.5,
                card: 7.5,
            },
            None,
        )
        .unwrap();
        assert_eq!(recon.method, PaymentMethodTag::Split);
        assert_eq!(recon.change, 0.0);

        let err = reconcile(
            &order,
            &PaymentPlan::CashAndCard {
                cash: 10.0,
                card: 7.5,
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::AmountMismatch { expected, actual }
                if expected == 20.0 && actual == 17.5
        ));
    }

    #[test]
    fn test_split_plan_collects_bill_payments_and_tips() {
        let order = order_with_total(30.0);
        let mut state = SplitState::equal(&order, 2).unwrap();
        let ids: Vec<String> = state.bills.iter().map(|b| b.id.clone()).collect();
        set_payment_method(&mut state, &ids[0], PaymentMethod::Cash).unwrap();
        set_payment_method(&mut state, &ids[1], PaymentMethod::Card).unwrap();
        set_tip(&mut state, &ids[0], Some(2.0)).unwrap();

        let recon = reconcile(&order, &PaymentPlan::Split(state), Some(1.0)).unwrap();
        assert_eq!(recon.method, PaymentMethodTag::Split);
        assert_eq!(recon.tips, 3.0);
        let sub_bills = recon.sub_bills.as_ref().unwrap();
        assert_eq!(sub_bills.len(), 2);
        assert_eq!(sub_bills[0].payment_method, PaymentMethod::Cash);
        assert_eq!(sub_bills[0].amount, 15.0);
    }

    #[test]
    fn test_split_plan_with_unpaid_bill_fails() {
        let order = order_with_total(30.0);
        let state = SplitState::equal(&order, 2).unwrap();
        let err = reconcile(&order, &PaymentPlan::Split(state), None).unwrap_err();
        assert!(matches!(err, CheckoutError::UnassignedSubBill(_)));
    }

    #[test]
    fn test_complete_order_records_payment() {
        let mut order = order_with_total(15.5);
        let recon = reconcile(&order, &PaymentPlan::Cash { tendered: 20.0 }, None).unwrap();
        complete_order(&mut order, &recon).unwrap();

        assert!(order.is_completed());
        assert_eq!(order.change, 4.5);
        assert_eq!(order.payments.len(), 1);
        assert!(order.completed_at.is_some());

        // Paying twice is rejected
        let err = reconcile(&order, &PaymentPlan::Card, None).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidOperation(_)));
    }

    #[test]
    fn test_submission_payload_from_completed_order() {
        let mut order = order_with_total(15.5);
        let recon = reconcile(&order, &PaymentPlan::Card, Some(2.0)).unwrap();
        complete_order(&mut order, &recon).unwrap();

        let submission = build_submission(&order, Some(&recon)).unwrap();
        assert_eq!(submission.total_amount, 15.5);
        assert_eq!(submission.payment_method, PaymentMethodTag::Card);
        assert_eq!(submission.tips, 2.0);
        assert!(submission.sub_bills.is_none());
    }

    #[test]
    fn test_till_transfer_flows_through_completion() {
        let mut order = Order::till_transfer(50.0);
        let recon = reconcile(&order, &PaymentPlan::Cash { tendered: 0.0 }, None).unwrap();
        complete_order(&mut order, &recon).unwrap();

        // Transfer amount is preserved, not overwritten by cash change
        assert_eq!(order.change, 50.0);
        let submission = build_submission(&order, None).unwrap();
        assert!(submission.items.is_empty());
        assert_eq!(submission.total_amount, 0.0);
        assert_eq!(submission.change, 50.0);
    }

    #[test]
    fn test_submission_requires_completed_order() {
        let order = order_with_total(10.0);
        let err = build_submission(&order, None).unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotCompleted(_)));
    }
}
