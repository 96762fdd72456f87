//! Catalog use-cases.

use common::ProductId;
use rust_decimal::Decimal;
use store::{MONEY_SCALE, Product, ProductDraft, Repository, max_unit_price};

use crate::error::DomainError;

/// Product reads and admin-only mutations over a [`Repository`].
///
/// The admin gate lives at the caller layer; this service only validates.
pub struct CatalogService<R: Repository> {
    repo: R,
}

impl<R: Repository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.repo.list_products().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, DomainError> {
        Ok(self.repo.get_product(id).await?)
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: ProductDraft) -> Result<ProductId, DomainError> {
        validate_fields(&draft.name, draft.unit_price, draft.quantity_on_hand)?;

        let id = self.repo.create_product(draft).await?;
        tracing::info!(product_id = %id, "product created");
        Ok(id)
    }

    /// Replaces every field of an existing product.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update(&self, product: Product) -> Result<(), DomainError> {
        validate_fields(&product.name, product.unit_price, product.quantity_on_hand)?;

        self.repo.update_product(product).await?;
        tracing::info!("product updated");
        Ok(())
    }

    /// Removes a product from the catalog. Placed orders keep their lines.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), DomainError> {
        self.repo.delete_product(id).await?;
        tracing::info!("product deleted");
        Ok(())
    }
}

fn validate_fields(name: &str, unit_price: Decimal, quantity_on_hand: i32) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("product name must not be empty".to_string()));
    }
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(DomainError::Validation(format!(
            "unit price must not be negative: {unit_price}"
        )));
    }
    if unit_price.normalize().scale() > MONEY_SCALE {
        return Err(DomainError::Validation(format!(
            "unit price must have at most {MONEY_SCALE} decimal places: {unit_price}"
        )));
    }
    if unit_price > max_unit_price() {
        return Err(DomainError::Validation(format!(
            "unit price must not exceed {}: {unit_price}",
            max_unit_price()
        )));
    }
    if quantity_on_hand < 0 {
        return Err(DomainError::Validation(format!(
            "quantity on hand must not be negative: {quantity_on_hand}"
        )));
    }
    Ok(())
}
