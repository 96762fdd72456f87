use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Identity, NewOrder, Order, OrderId, OrderLine, OrderStatus, Product, ProductDraft, ProductId,
    Result, StoreError, SubjectId, credential, repository::Repository,
};

const ORDER_COLUMNS: &str = "id, owner_id, status, total, created_at, updated_at";
const ITEM_COLUMNS: &str = "order_id, product_id, quantity, unit_price";

/// PostgreSQL-backed repository implementation.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new PostgreSQL repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn decode_status(code: i16) -> Result<OrderStatus> {
        OrderStatus::from_code(code).map_err(|e| StoreError::CorruptRow(e.to_string()))
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            unit_price: row.try_get("unit_price")?,
            quantity_on_hand: row.try_get("quantity_on_hand")?,
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
        })
    }

    fn row_to_order(row: PgRow, line_items: Vec<OrderLine>) -> Result<Order> {
        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            owner: SubjectId::new(row.try_get("owner_id")?),
            status: Self::decode_status(row.try_get("status")?)?,
            total: row.try_get("total")?,
            line_items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Loads line items for a batch of orders, grouped by order id.
    async fn load_lines(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderLine>>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in &rows {
            let order_id: i64 = row.try_get("order_id")?;
            lines
                .entry(order_id)
                .or_default()
                .push(Self::row_to_line(row)?);
        }
        Ok(lines)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn verify_credentials(&self, email: &str, secret: &str) -> Result<Identity> {
        let row = sqlx::query("SELECT id, secret_hash, is_admin FROM credentials WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            credential::verify_unknown_account(secret);
            return Err(StoreError::not_found("Credential", email));
        };

        let secret_hash: String = row.try_get("secret_hash")?;
        if !credential::verify_secret(secret, &secret_hash) {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(Identity {
            subject_id: SubjectId::new(row.try_get("id")?),
            is_admin: row.try_get("is_admin")?,
        })
    }

    async fn create_credential(&self, email: &str, secret_hash: &str) -> Result<SubjectId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO credentials (email, secret_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::DuplicateIdentity {
                    email: email.to_string(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(SubjectId::new(id))
    }

    async fn grant_admin(&self, subject_id: SubjectId) -> Result<()> {
        let result = sqlx::query("UPDATE credentials SET is_admin = TRUE WHERE id = $1")
            .bind(subject_id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Subject", subject_id));
        }
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, unit_price, quantity_on_hand
            FROM products
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, unit_price, quantity_on_hand
            FROM products
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Product", id))?;

        Self::row_to_product(row)
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<ProductId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, description, unit_price, quantity_on_hand)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.unit_price)
        .bind(draft.quantity_on_hand)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, unit_price = $4, quantity_on_hand = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(product.id.as_i64())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.quantity_on_hand)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", product.id));
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }

    async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(order_id.as_i64())
            .bind(status.code())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", order_id));
        }
        Ok(())
    }

    async fn list_orders_for_owner(&self, owner: SubjectId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = $1 ORDER BY id ASC"
        ))
        .bind(owner.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.load_lines(&ids).await?;

        rows.into_iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_order(row, lines.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", id))?;

        let mut lines = self.load_lines(&[id.as_i64()]).await?;
        Self::row_to_order(row, lines.remove(&id.as_i64()).unwrap_or_default())
    }

    async fn cancel_order_if_pending(&self, id: OrderId) -> Result<()> {
        // Single conditional update; the row lock serializes concurrent cancels.
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(id.as_i64())
        .bind(OrderStatus::Canceled.code())
        .bind(OrderStatus::Pending.code())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let current: Option<i16> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(order_id = %id, ?current, "conditional cancel matched no pending row");

        match current {
            None => Err(StoreError::not_found("Order", id)),
            Some(code) => Err(StoreError::InvalidTransition {
                order_id: id,
                current: Self::decode_status(code)?,
            }),
        }
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (owner_id, status, total) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(order.owner.as_i64())
        .bind(order.status.code())
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in order.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(position as i32)
            .bind(line.product_id.as_i64())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(order_id = id, lines = order.line_items.len(), "order inserted");
        Ok(OrderId::new(id))
    }
}
