//! HTTP API server for the shop backend.
//!
//! Provides REST endpoints for accounts, the product catalog and orders,
//! behind a bearer-token gate, with structured logging (tracing) and
//! Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use domain::{AccountService, CatalogService, OrderService, TokenService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Repository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{AppState, accounts, orders, products, system};

/// Creates the Axum application router with all routes and shared state.
///
/// Everything except login, registration, health and metrics sits behind the
/// bearer-token gate; catalog mutations and the status override additionally
/// require the admin role.
pub fn create_app<R: Repository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let protected = Router::new()
        .route(
            "/products",
            get(products::list::<R>).merge(
                delete(products::delete::<R>)
                    .route_layer(middleware::from_fn(auth::require_admin)),
            ),
        )
        .route("/product/{id}", get(products::get::<R>))
        .route(
            "/product",
            post(products::create::<R>).route_layer(middleware::from_fn(auth::require_admin)),
        )
        .route(
            "/product/",
            put(products::update::<R>).route_layer(middleware::from_fn(auth::require_admin)),
        )
        .route(
            "/orders",
            put(orders::update_status::<R>)
                .route_layer(middleware::from_fn(auth::require_admin)),
        )
        .route("/order/", get(orders::list::<R>))
        .route("/order/{id}", get(orders::get::<R>))
        .route("/order/cancel", put(orders::cancel::<R>))
        .route("/order/new", post(orders::place::<R>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            auth::require_auth,
        ))
        .with_state(Arc::clone(&state));

    let public = Router::new()
        .route("/auth/login", post(accounts::login::<R>))
        .route("/auth/register", post(accounts::register::<R>))
        .route("/health", get(system::health))
        .with_state(state);

    let metrics_router = Router::new()
        .route("/metrics", get(system::metrics))
        .with_state(metrics_handle);

    public
        .merge(protected)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service sharing one repository.
pub fn create_default_state<R: Repository + 'static>(
    repo: R,
    tokens: Arc<TokenService>,
) -> Arc<AppState<R>> {
    Arc::new(AppState {
        accounts: AccountService::new(repo.clone(), Arc::clone(&tokens)),
        catalog: CatalogService::new(repo.clone()),
        orders: OrderService::new(repo),
        tokens,
    })
}
