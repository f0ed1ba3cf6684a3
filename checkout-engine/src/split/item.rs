//! Item-assigned split

use rust_decimal::Decimal;

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{to_decimal, to_f64};
use shared::order::{Order, SubBill};

use super::SplitState;

/// Generate `count` empty bills; the operator then assigns each line
/// to exactly one of them.
pub fn item_split(count: usize) -> CheckoutResult<Vec<SubBill>> {
    if count == 0 {
        return Err(CheckoutError::InvalidOperation(
            "split requires at least one sub-bill".to_string(),
        ));
    }
    Ok((0..count).map(|_| SubBill::new(0.0)).collect())
}

/// Assign a line to a bill. A line already held by another bill is
/// moved, not duplicated; both bills' totals are recomputed.
pub fn assign_line(
    state: &mut SplitState,
    bill_id: &str,
    order: &Order,
    instance_id: &str,
) -> CheckoutResult<()> {
    if order.line(instance_id).is_none() {
        return Err(CheckoutError::LineNotFound(instance_id.to_string()));
    }
    state.bill(bill_id)?;

    for bill in &mut state.bills {
        bill.assigned_lines.retain(|id| id != instance_id);
    }
    state
        .bill_mut(bill_id)?
        .assigned_lines
        .push(instance_id.to_string());

    recompute_totals(state, order);
    Ok(())
}

/// Remove a line from whichever bill holds it.
pub fn unassign_line(
    state: &mut SplitState,
    order: &Order,
    instance_id: &str,
) -> CheckoutResult<()> {
    let held = state
        .bills
        .iter()
        .any(|b| b.assigned_lines.iter().any(|id| id == instance_id));
    if !held {
        return Err(CheckoutError::LineNotFound(instance_id.to_string()));
    }

    for bill in &mut state.bills {
        bill.assigned_lines.retain(|id| id != instance_id);
    }
    recompute_totals(state, order);
    Ok(())
}

/// Every order line must be assigned to exactly one bill before the
/// split can be checked out.
pub fn validate_assignment(state: &SplitState, order: &Order) -> CheckoutResult<()> {
    for line in &order.lines {
        let holders = state
            .bills
            .iter()
            .filter(|b| b.assigned_lines.iter().any(|id| *id == line.instance_id))
            .count();
        if holders != 1 {
            return Err(CheckoutError::UnassignedLine(line.instance_id.clone()));
        }
    }
    Ok(())
}

/// A bill's total is the sum of its assigned lines, re-derived on
/// every assignment change.
fn recompute_totals(state: &mut SplitState, order: &Order) {
    for bill in &mut state.bills {
        let total: Decimal = bill
            .assigned_lines
            .iter()
            .filter_map(|id| order.line(id))
            .map(|line| to_decimal(line.total_price))
            .sum();
        bill.total = to_f64(total);
    }
}
