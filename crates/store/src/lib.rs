pub mod credential;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod repository;

pub use common::{Identity, OrderId, OrderStatus, ProductId, SubjectId};
pub use error::{Result, StoreError};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use records::{
    MONEY_SCALE, NewOrder, Order, OrderLine, Product, ProductDraft, is_storable_price,
    max_order_total, max_unit_price,
};
pub use repository::Repository;
