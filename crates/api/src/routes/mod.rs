//! HTTP handlers, grouped by resource.

pub mod accounts;
pub mod orders;
pub mod products;
pub mod system;

use std::sync::Arc;

use domain::{AccountService, CatalogService, OrderService, TokenService};
use store::Repository;

/// Shared application state accessible from all handlers.
pub struct AppState<R: Repository> {
    pub accounts: AccountService<R>,
    pub catalog: CatalogService<R>,
    pub orders: OrderService<R>,
    pub tokens: Arc<TokenService>,
}
