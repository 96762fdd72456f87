//! Order status rules.
//!
//! ```text
//! (create) ──► Pending ──cancel──► Canceled
//!                 │
//!                 └──admin set_status──► any defined status
//! ```
//!
//! The owner path is strict: only `Pending` can be canceled. The admin
//! override is permissive and accepts any defined status from any status;
//! only the zero/unknown code is refused.

use common::{OrderId, OrderStatus, SubjectId};
use rust_decimal::Decimal;
use store::{NewOrder, OrderLine, is_storable_price, max_order_total};

use super::OrderError;

/// Transition checks on [`OrderStatus`].
pub trait StatusRules {
    /// Returns true if the owner may cancel from this status.
    fn can_cancel(&self) -> bool;

    /// Fails with `InvalidTransition` unless the order can be canceled.
    fn ensure_cancelable(&self, order_id: OrderId) -> Result<(), OrderError>;
}

impl StatusRules for OrderStatus {
    fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    fn ensure_cancelable(&self, order_id: OrderId) -> Result<(), OrderError> {
        if self.can_cancel() {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                order_id,
                current: *self,
                action: "cancel",
            })
        }
    }
}

/// Resolves a raw status code supplied by a caller. `0` and unknown codes
/// fail with `InvalidStatus`.
pub fn resolve_status(code: i16) -> Result<OrderStatus, OrderError> {
    Ok(OrderStatus::from_code(code)?)
}

/// Checks that there is at least one line, every quantity is positive and
/// every price fits the unit price column.
pub fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::NoItems);
    }

    for line in lines {
        if line.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
        if !is_storable_price(line.unit_price) {
            return Err(OrderError::InvalidPrice {
                product_id: line.product_id,
                price: line.unit_price,
            });
        }
    }

    Ok(())
}

/// Sum of `quantity * unit_price` over all lines.
///
/// Fails with `TotalOutOfRange` when the sum overflows or exceeds the order
/// total column.
pub fn order_total(lines: &[OrderLine]) -> Result<Decimal, OrderError> {
    let total = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| {
            line.line_total().and_then(|amount| acc.checked_add(amount))
        })
        .ok_or(OrderError::TotalOutOfRange)?;

    if total > max_order_total() {
        return Err(OrderError::TotalOutOfRange);
    }
    Ok(total)
}

/// Builds a validated order in the initial `Pending` status.
pub fn pending_order(owner: SubjectId, lines: Vec<OrderLine>) -> Result<NewOrder, OrderError> {
    validate_lines(&lines)?;
    let total = order_total(&lines)?;

    Ok(NewOrder {
        owner,
        status: OrderStatus::Pending,
        total,
        line_items: lines,
    })
}
