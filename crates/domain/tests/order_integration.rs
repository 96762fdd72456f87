//! Integration tests for the order lifecycle and the account flow.
//!
//! These run the use-cases against the in-memory repository, the same way the
//! API wires them when no database is configured.

use std::sync::Arc;

use domain::{
    AccountService, CatalogService, DomainError, ErrorKind, Identity, LineRequest, OrderError,
    OrderLine, OrderService, OrderStatus, ProductDraft, ProductId, SubjectId, TokenService,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use store::InMemoryRepository;

fn create_service() -> OrderService<InMemoryRepository> {
    OrderService::new(InMemoryRepository::new())
}

fn customer(id: i64) -> Identity {
    Identity::customer(SubjectId::new(id))
}

fn sample_lines() -> Vec<OrderLine> {
    vec![
        OrderLine::new(ProductId::new(1), 2, Decimal::new(1000, 2)),
        OrderLine::new(ProductId::new(2), 1, Decimal::new(500, 2)),
    ]
}

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn create_yields_pending_with_summed_total() {
        let service = create_service();

        let order_id = service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();
        let order = service.get(&customer(1), order_id).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::new(2500, 2));
        assert_eq!(order.total.to_string(), "25.00");
    }

    #[tokio::test]
    async fn cancel_shipped_order_fails_and_keeps_status() {
        let service = create_service();
        let order_id = service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();
        service
            .set_status(order_id, OrderStatus::Shipped)
            .await
            .unwrap();

        let err = service.cancel(&customer(1), order_id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::InvalidTransition {
                current: OrderStatus::Shipped,
                ..
            })
        ));

        let order = service.get(&customer(1), order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn every_terminal_status_refuses_cancel() {
        let service = create_service();

        for status in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            let order_id = service
                .create(SubjectId::new(1), sample_lines())
                .await
                .unwrap();
            service.set_status(order_id, status).await.unwrap();

            let err = service.cancel(&customer(1), order_id).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTransition, "from {status}");
        }
    }

    #[tokio::test]
    async fn admin_can_refund_delivered_order() {
        let service = create_service();
        let order_id = service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();
        service
            .set_status(order_id, OrderStatus::Delivered)
            .await
            .unwrap();

        service
            .set_status(order_id, OrderStatus::Refunded)
            .await
            .unwrap();

        let order = service.get(&customer(1), order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[tokio::test]
    async fn set_status_on_missing_order_is_not_found() {
        let service = create_service();
        let err = service
            .set_status(domain::OrderId::new(77), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cancel_missing_order_is_not_found() {
        let service = create_service();
        let err = service
            .cancel(&customer(1), domain::OrderId::new(77))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let service = create_service();
        let err = service.create(SubjectId::new(1), vec![]).await.unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::NoItems)));
        assert!(
            service
                .list_for_owner(SubjectId::new(1))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let service = create_service();
        let lines = vec![OrderLine::new(ProductId::new(1), 0, Decimal::new(1000, 2))];

        let err = service.create(SubjectId::new(1), lines).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(
            service
                .list_for_owner(SubjectId::new(1))
                .await
                .unwrap()
                .is_empty()
        );
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn other_customers_order_is_hidden() {
        let service = create_service();
        let order_id = service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();

        let err = service.get(&customer(2), order_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let admin = Identity::admin(SubjectId::new(5));
        assert!(service.get(&admin, order_id).await.is_ok());
    }

    #[tokio::test]
    async fn list_returns_only_own_orders() {
        let service = create_service();
        service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();
        service
            .create(SubjectId::new(2), sample_lines())
            .await
            .unwrap();
        service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();

        let orders = service.list_for_owner(SubjectId::new(1)).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.owner == SubjectId::new(1)));
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn concurrent_cancels_never_both_succeed() {
        let service = Arc::new(create_service());
        let order_id = service
            .create(SubjectId::new(1), sample_lines())
            .await
            .unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.cancel(&customer(1), order_id).await })
            })
            .collect();

        let mut succeeded = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
                    conflicts += 1;
                }
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(conflicts, 1);
        let order = service.get(&customer(1), order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
    }
}

mod shopping_flow {
    use super::*;

    #[tokio::test]
    async fn register_login_and_order_from_catalog() {
        let repo = InMemoryRepository::new();
        let tokens = Arc::new(
            TokenService::new(&SecretString::from("integration-secret".to_string())).unwrap(),
        );
        let accounts = AccountService::new(repo.clone(), Arc::clone(&tokens));
        let catalog = CatalogService::new(repo.clone());
        let orders = OrderService::new(repo);

        accounts.ensure_admin("admin@x.com", "root").await.unwrap();
        let product_id = catalog
            .create(ProductDraft {
                name: "Widget".to_string(),
                description: "Blue".to_string(),
                unit_price: Decimal::new(1000, 2),
                quantity_on_hand: 10,
            })
            .await
            .unwrap();

        let subject_id = accounts.register("a@x.com", "pw1").await.unwrap();
        let token = accounts.login("a@x.com", "pw1").await.unwrap();
        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity, Identity::customer(subject_id));

        let order_id = orders
            .place_order(
                &identity,
                vec![LineRequest {
                    product_id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap();

        orders.cancel(&identity, order_id).await.unwrap();
        let order = orders.get(&identity, order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(order.total, Decimal::new(2000, 2));
    }
}
