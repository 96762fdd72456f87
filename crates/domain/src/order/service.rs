//! Order lifecycle manager.

use common::{Identity, OrderId, OrderStatus, ProductId, SubjectId};
use serde::Deserialize;
use store::{Order, OrderLine, Repository};

use crate::error::DomainError;

use super::{OrderError, StatusRules, pending_order};

/// A line of an order as requested by a customer: which product and how many.
/// The unit price is read from the catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Service owning every order mutation.
///
/// Status rules are enforced here; durability and the atomic cancel are left
/// to the repository. Admin-only operations are gated by the caller.
pub struct OrderService<R: Repository> {
    repo: R,
}

impl<R: Repository> OrderService<R> {
    /// Creates a new order service over the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a `Pending` order from already-priced lines.
    #[tracing::instrument(skip(self, line_items), fields(lines = line_items.len()))]
    pub async fn create(
        &self,
        owner: SubjectId,
        line_items: Vec<OrderLine>,
    ) -> Result<OrderId, DomainError> {
        let order = pending_order(owner, line_items)?;
        let total = order.total;
        let order_id = self.repo.create_order(order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, %total, "order created");
        Ok(order_id)
    }

    /// Places an order for `actor`, capturing each product's current price.
    ///
    /// Quantities are checked before any catalog read; an unknown product
    /// fails with `NotFound`.
    #[tracing::instrument(skip(self, requests), fields(subject = %actor.subject_id))]
    pub async fn place_order(
        &self,
        actor: &Identity,
        requests: Vec<LineRequest>,
    ) -> Result<OrderId, DomainError> {
        if requests.is_empty() {
            return Err(OrderError::NoItems.into());
        }
        if let Some(bad) = requests.iter().find(|r| r.quantity <= 0) {
            return Err(OrderError::InvalidQuantity {
                product_id: bad.product_id,
                quantity: bad.quantity,
            }
            .into());
        }

        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let product = self.repo.get_product(request.product_id).await?;
            lines.push(OrderLine::new(
                product.id,
                request.quantity,
                product.unit_price,
            ));
        }

        self.create(actor.subject_id, lines).await
    }

    /// Cancels a `Pending` order.
    ///
    /// Non-admin actors can only cancel their own orders; any other order is
    /// reported as `NotFound`. The final `Pending → Canceled` step is the
    /// repository's atomic conditional update, so of two racing cancels at
    /// most one succeeds.
    #[tracing::instrument(skip(self), fields(subject = %actor.subject_id))]
    pub async fn cancel(&self, actor: &Identity, order_id: OrderId) -> Result<(), DomainError> {
        let order = self.get(actor, order_id).await?;
        order.status.ensure_cancelable(order_id)?;

        self.repo.cancel_order_if_pending(order_id).await?;

        metrics::counter!("orders_canceled_total").increment(1);
        tracing::info!(%order_id, "order canceled");
        Ok(())
    }

    /// Overwrites an order's status. Admin-only at the caller layer.
    ///
    /// Any defined status is accepted from any current status.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), DomainError> {
        self.repo.set_order_status(order_id, status).await?;

        metrics::counter!("order_status_overrides_total").increment(1);
        tracing::info!(%order_id, %status, "order status overridden");
        Ok(())
    }

    /// Loads an order visible to `actor`.
    ///
    /// Orders owned by someone else are reported as `NotFound` unless the
    /// actor is an admin.
    #[tracing::instrument(skip(self), fields(subject = %actor.subject_id))]
    pub async fn get(&self, actor: &Identity, order_id: OrderId) -> Result<Order, DomainError> {
        let order = self.repo.get_order(order_id).await?;
        if !actor.can_access(order.owner) {
            return Err(DomainError::not_found("Order", order_id));
        }
        Ok(order)
    }

    /// Lists the orders owned by `owner`.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_owner(&self, owner: SubjectId) -> Result<Vec<Order>, DomainError> {
        Ok(self.repo.list_orders_for_owner(owner).await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use store::{InMemoryRepository, ProductDraft};

    use super::*;
    use crate::error::ErrorKind;

    fn service() -> OrderService<InMemoryRepository> {
        OrderService::new(InMemoryRepository::new())
    }

    fn customer(id: i64) -> Identity {
        Identity::customer(SubjectId::new(id))
    }

    fn two_lines() -> Vec<OrderLine> {
        vec![
            OrderLine::new(ProductId::new(1), 2, Decimal::new(1000, 2)),
            OrderLine::new(ProductId::new(2), 1, Decimal::new(500, 2)),
        ]
    }

    #[tokio::test]
    async fn test_create_order() {
        let service = service();
        let id = service.create(SubjectId::new(1), two_lines()).await.unwrap();

        let order = service.get(&customer(1), id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::new(2500, 2));
        assert_eq!(order.line_items, two_lines());
    }

    #[tokio::test]
    async fn test_create_rejects_empty() {
        let service = service();
        let err = service.create(SubjectId::new(1), vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_place_order_captures_catalog_price() {
        let service = service();
        let product_id = service
            .repository()
            .create_product(ProductDraft {
                name: "Widget".to_string(),
                description: String::new(),
                unit_price: Decimal::new(1000, 2),
                quantity_on_hand: 5,
            })
            .await
            .unwrap();

        let order_id = service
            .place_order(
                &customer(1),
                vec![LineRequest {
                    product_id,
                    quantity: 3,
                }],
            )
            .await
            .unwrap();

        // A later price change must not touch the placed order.
        let mut product = service.repository().get_product(product_id).await.unwrap();
        product.unit_price = Decimal::new(9999, 2);
        service.repository().update_product(product).await.unwrap();

        let order = service.get(&customer(1), order_id).await.unwrap();
        assert_eq!(order.line_items[0].unit_price, Decimal::new(1000, 2));
        assert_eq!(order.total, Decimal::new(3000, 2));
    }

    #[tokio::test]
    async fn test_place_order_unknown_product() {
        let service = service();
        let err = service
            .place_order(
                &customer(1),
                vec![LineRequest {
                    product_id: ProductId::new(42),
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_place_order_with_overflowing_total_is_rejected() {
        let service = service();
        let product_id = service
            .repository()
            .create_product(ProductDraft {
                name: "Yacht".to_string(),
                description: String::new(),
                unit_price: Decimal::MAX,
                quantity_on_hand: 5,
            })
            .await
            .unwrap();

        let err = service
            .place_order(
                &customer(1),
                vec![LineRequest {
                    product_id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(
            service
                .list_for_owner(SubjectId::new(1))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_place_order_rejects_zero_quantity_before_lookup() {
        let service = service();
        let err = service
            .place_order(
                &customer(1),
                vec![LineRequest {
                    product_id: ProductId::new(42),
                    quantity: 0,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_cancel_pending_order() {
        let service = service();
        let id = service.create(SubjectId::new(1), two_lines()).await.unwrap();

        service.cancel(&customer(1), id).await.unwrap();

        let order = service.get(&customer(1), id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
    }

    #[tokio::test]
    async fn test_cancel_other_owners_order_is_not_found() {
        let service = service();
        let id = service.create(SubjectId::new(1), two_lines()).await.unwrap();

        let err = service.cancel(&customer(2), id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let admin = Identity::admin(SubjectId::new(9));
        service.cancel(&admin, id).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_status_overrides_terminal() {
        let service = service();
        let id = service.create(SubjectId::new(1), two_lines()).await.unwrap();

        service
            .set_status(id, OrderStatus::Delivered)
            .await
            .unwrap();
        service.set_status(id, OrderStatus::Refunded).await.unwrap();

        let order = service.get(&customer(1), id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[tokio::test]
    async fn test_list_for_owner() {
        let service = service();
        service.create(SubjectId::new(1), two_lines()).await.unwrap();
        service.create(SubjectId::new(2), two_lines()).await.unwrap();

        let orders = service.list_for_owner(SubjectId::new(1)).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].owner, SubjectId::new(1));
    }
}
