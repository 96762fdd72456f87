//! Order lifecycle and related types.

mod service;
mod state;

pub use service::{LineRequest, OrderService};
pub use state::{StatusRules, order_total, pending_order, resolve_status, validate_lines};

use common::{OrderId, OrderStatus, ProductId, UnknownStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the order lifecycle rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order has no line items.
    #[error("Order has no items")]
    NoItems,

    /// A line item has a non-positive quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: i32 },

    /// A line item carries a price the unit price column cannot hold.
    #[error(
        "Invalid price for product {product_id}: {price} (must be between 0 and {max} with at most 2 decimal places)",
        max = store::max_unit_price()
    )]
    InvalidPrice { product_id: ProductId, price: Decimal },

    /// The order total overflows or exceeds the order total column.
    #[error("Order total exceeds the maximum of {max}", max = store::max_order_total())]
    TotalOutOfRange,

    /// The order is not in a status the requested action is allowed from.
    #[error("Invalid state transition: cannot {action} order {order_id} from {current} status")]
    InvalidTransition {
        order_id: OrderId,
        current: OrderStatus,
        action: &'static str,
    },

    /// The target status is zero/unknown.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),
}

impl From<UnknownStatus> for OrderError {
    fn from(err: UnknownStatus) -> Self {
        OrderError::InvalidStatus(err.0)
    }
}
