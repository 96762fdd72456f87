use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Identity, NewOrder, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId, Result,
    StoreError, SubjectId, credential, repository::Repository,
};

#[derive(Debug, Clone)]
struct CredentialRow {
    subject_id: SubjectId,
    email: String,
    secret_hash: String,
    is_admin: bool,
}

#[derive(Debug, Default)]
struct Tables {
    credentials: Vec<CredentialRow>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_subject_id: i64,
    last_product_id: i64,
    last_order_id: i64,
}

/// In-memory repository for tests and database-less runs.
///
/// Every write takes the single table lock, which gives the conditional
/// cancel the same at-most-one-winner guarantee as the PostgreSQL version.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn verify_credentials(&self, email: &str, secret: &str) -> Result<Identity> {
        let row = {
            let tables = self.tables.read().await;
            tables
                .credentials
                .iter()
                .find(|row| row.email == email)
                .cloned()
        };
        let Some(row) = row else {
            credential::verify_unknown_account(secret);
            return Err(StoreError::not_found("Credential", email));
        };

        if !credential::verify_secret(secret, &row.secret_hash) {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(Identity {
            subject_id: row.subject_id,
            is_admin: row.is_admin,
        })
    }

    async fn create_credential(&self, email: &str, secret_hash: &str) -> Result<SubjectId> {
        let mut tables = self.tables.write().await;

        if tables.credentials.iter().any(|row| row.email == email) {
            return Err(StoreError::DuplicateIdentity {
                email: email.to_string(),
            });
        }

        tables.last_subject_id += 1;
        let subject_id = SubjectId::new(tables.last_subject_id);
        tables.credentials.push(CredentialRow {
            subject_id,
            email: email.to_string(),
            secret_hash: secret_hash.to_string(),
            is_admin: false,
        });

        Ok(subject_id)
    }

    async fn grant_admin(&self, subject_id: SubjectId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let row = tables
            .credentials
            .iter_mut()
            .find(|row| row.subject_id == subject_id)
            .ok_or_else(|| StoreError::not_found("Subject", subject_id))?;
        row.is_admin = true;
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<ProductId> {
        let mut tables = self.tables.write().await;
        tables.last_product_id += 1;
        let id = ProductId::new(tables.last_product_id);
        tables.products.insert(id, draft.with_id(id));
        Ok(id)
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::not_found("Product", product.id))?;
        *slot = product;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn list_orders_for_owner(&self, owner: SubjectId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|order| order.owner == owner)
            .cloned()
            .collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        let tables = self.tables.read().await;
        tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order", id))
    }

    async fn cancel_order_if_pending(&self, id: OrderId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Order", id))?;

        if order.status != OrderStatus::Pending {
            return Err(StoreError::InvalidTransition {
                order_id: id,
                current: order.status,
            });
        }

        order.status = OrderStatus::Canceled;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut tables = self.tables.write().await;
        tables.last_order_id += 1;
        let id = OrderId::new(tables.last_order_id);
        let now = Utc::now();

        tables.orders.insert(
            id,
            Order {
                id,
                owner: order.owner,
                status: order.status,
                total: order.total,
                line_items: order.line_items,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }
}
