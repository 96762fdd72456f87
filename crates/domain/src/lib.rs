//! Domain layer for the shop backend.
//!
//! This crate provides:
//! - the identity token service (signed, time-bounded bearer tokens)
//! - the order lifecycle manager and its status rules
//! - account (register/login) and catalog use-cases
//! - the error taxonomy every use-case reports through

pub mod account;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod order;

pub use account::AccountService;
pub use catalog::CatalogService;
pub use error::{DomainError, ErrorKind};
pub use identity::{Claims, TOKEN_TTL_HOURS, TokenError, TokenService};
pub use order::{LineRequest, OrderError, OrderService, StatusRules};

pub use common::{Identity, OrderId, OrderStatus, ProductId, SubjectId};
pub use store::{Order, OrderLine, Product, ProductDraft};
