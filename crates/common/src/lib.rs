//! Shared types for the shop backend.
//!
//! Identifiers, the order status code table and the identity claim set are
//! used by the storage, domain and HTTP layers alike, so they live here.

pub mod identity;
pub mod status;
pub mod types;

pub use identity::Identity;
pub use status::{OrderStatus, UnknownStatus};
pub use types::{OrderId, ProductId, SubjectId};
