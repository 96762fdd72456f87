use async_trait::async_trait;

use crate::{
    Identity, NewOrder, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId, Result,
    SubjectId,
};

/// Persistence contract the domain layer depends on.
///
/// Implementations own durability and the serialization of concurrent writes
/// to a single order row. Clones share the same underlying storage.
#[async_trait]
pub trait Repository: Clone + Send + Sync {
    /// Looks up the credential bound to `email` and checks `secret` against it.
    ///
    /// Fails with `NotFound` for an unknown email and `InvalidCredentials`
    /// for a mismatching secret. Both failures cost one secret verification.
    async fn verify_credentials(&self, email: &str, secret: &str) -> Result<Identity>;

    /// Binds a new non-admin credential to `email`.
    ///
    /// Fails with `DuplicateIdentity` if the email is already bound.
    async fn create_credential(&self, email: &str, secret_hash: &str) -> Result<SubjectId>;

    /// Gives an existing subject the admin role.
    async fn grant_admin(&self, subject_id: SubjectId) -> Result<()>;

    /// Returns all live products ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Product>;

    async fn create_product(&self, draft: ProductDraft) -> Result<ProductId>;

    async fn update_product(&self, product: Product) -> Result<()>;

    /// Soft-deletes a product. Stored order lines are unaffected.
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Overwrites the status of an order without consulting its current value.
    async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()>;

    /// Returns the owner's orders ordered by id, line items in placement order.
    async fn list_orders_for_owner(&self, owner: SubjectId) -> Result<Vec<Order>>;

    async fn get_order(&self, id: OrderId) -> Result<Order>;

    /// Moves an order from `Pending` to `Canceled` as one atomic step.
    ///
    /// Fails with `NotFound` if the order does not exist and
    /// `InvalidTransition` if it is not `Pending` at the moment of the check.
    /// Of two concurrent calls on the same order at most one succeeds.
    async fn cancel_order_if_pending(&self, id: OrderId) -> Result<()>;

    /// Inserts an order together with its line items.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId>;
}
