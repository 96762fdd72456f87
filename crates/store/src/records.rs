//! Rows exchanged across the repository boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, ProductId, SubjectId};

/// Decimal places kept by every money column.
pub const MONEY_SCALE: u32 = 2;

/// Largest unit price a `NUMERIC(12, 2)` column holds.
pub fn max_unit_price() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Largest order total a `NUMERIC(14, 2)` column holds.
pub fn max_order_total() -> Decimal {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// Whether `price` fits a unit price column without rounding or overflow.
pub fn is_storable_price(price: Decimal) -> bool {
    !(price.is_sign_negative() && !price.is_zero())
        && price.normalize().scale() <= MONEY_SCALE
        && price <= max_unit_price()
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity_on_hand: i32,
}

/// A product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity_on_hand: i32,
}

impl ProductDraft {
    /// Attaches the key assigned by the repository.
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            unit_price: self.unit_price,
            quantity_on_hand: self.quantity_on_hand,
        }
    }
}

/// A line of an order, priced when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price captured at order time, never re-read from the catalog.
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns `quantity * unit_price`, or `None` when it overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// An order ready to be inserted. The repository assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub owner: SubjectId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub line_items: Vec<OrderLine>,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: SubjectId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub line_items: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
