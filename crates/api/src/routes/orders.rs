//! Order endpoints.
//!
//! Every handler takes the [`Identity`] attached by the authorization gate and
//! passes it to the order service, which scopes reads and cancels to the
//! caller's own orders.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use domain::order::resolve_status;
use domain::{
    DomainError, Identity, LineRequest, Order, OrderError, OrderId, OrderStatus, ProductId,
    SubjectId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::Repository;

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<LineRequest>,
}

/// A status as sent by a client: its numeric code or its name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusInput {
    Code(i64),
    Name(String),
}

impl StatusInput {
    /// Resolves to a defined status. `0` and unknown values are `InvalidStatus`.
    pub fn resolve(self) -> Result<OrderStatus, DomainError> {
        let status = match self {
            StatusInput::Code(code) => {
                let code = i16::try_from(code)
                    .map_err(|_| OrderError::InvalidStatus(code.to_string()))?;
                resolve_status(code)?
            }
            StatusInput::Name(name) => name.parse::<OrderStatus>().map_err(OrderError::from)?,
        };
        Ok(status)
    }
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub id: OrderId,
    pub status: StatusInput,
}

#[derive(Debug, Deserialize)]
pub struct OrderIdQuery {
    pub id: OrderId,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: SubjectId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.owner,
            status: order.status,
            total: order.total,
            items: order
                .line_items
                .into_iter()
                .map(|line| OrderItemResponse {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

// -- Handlers --

/// GET /order/ — the caller's own orders.
#[tracing::instrument(skip(state), fields(subject = %identity.subject_id))]
pub async fn list<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_for_owner(identity.subject_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /order/{id}
#[tracing::instrument(skip(state), fields(subject = %identity.subject_id))]
pub async fn get<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.get(&identity, id).await?;
    Ok(Json(order.into()))
}

/// POST /order/new — place an order priced from the catalog.
#[tracing::instrument(skip(state, req), fields(subject = %identity.subject_id))]
pub async fn place<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let order_id = state.orders.place_order(&identity, req.items).await?;

    let response = OrderCreatedResponse {
        order_id,
        status: OrderStatus::Pending,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /order/cancel?id= — cancel a pending order.
#[tracing::instrument(skip(state), fields(subject = %identity.subject_id))]
pub async fn cancel<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<OrderIdQuery>,
) -> Result<Json<OrderResponse>, ApiError> {
    state.orders.cancel(&identity, query.id).await?;

    let order = state.orders.get(&identity, query.id).await?;
    Ok(Json(order.into()))
}

/// PUT /orders (admin) — overwrite an order's status.
#[tracing::instrument(skip(state, req), fields(order_id = %req.id))]
pub async fn update_status<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status = req.status.resolve()?;
    state.orders.set_status(req.id, status).await?;

    let order = state.orders.get(&identity, req.id).await?;
    Ok(Json(order.into()))
}
