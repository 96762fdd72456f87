//! Catalog endpoints. Reads need a token; mutations also need the admin role.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{Product, ProductDraft, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::Repository;

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    pub id: ProductId,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.unit_price,
            quantity: product.quantity_on_hand,
        }
    }
}

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub id: ProductId,
}

// -- Handlers --

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn list<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// GET /product/{id}
#[tracing::instrument(skip(state))]
pub async fn get<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get(id).await?;
    Ok(Json(product.into()))
}

/// POST /product (admin)
#[tracing::instrument(skip(state, req))]
pub async fn create<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    let id = state
        .catalog
        .create(ProductDraft {
            name: req.name,
            description: req.description,
            unit_price: req.price,
            quantity_on_hand: req.quantity,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductCreatedResponse { id })))
}

/// PUT /product/ (admin) — replace every field of an existing product.
#[tracing::instrument(skip(state, req), fields(product_id = %req.id))]
pub async fn update<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = Product {
        id: req.id,
        name: req.name,
        description: req.description,
        unit_price: req.price,
        quantity_on_hand: req.quantity,
    };
    state.catalog.update(product.clone()).await?;
    Ok(Json(product.into()))
}

/// DELETE /products?id= (admin)
#[tracing::instrument(skip(state))]
pub async fn delete<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ProductIdQuery>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
