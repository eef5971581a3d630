// Bakery pricing and fulfillment API
// Region-aware prices, carts, delivery commitments and order lifecycle

pub mod auth;
pub mod calendar;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod pricing;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;


use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::calendar::{CalendarService, CalendarStore, PgCalendarStore};
use crate::cart::{CartAggregator, CartService, CartStore, PgCartStore};
use crate::catalog::{CatalogReader, PgCatalogReader};
use crate::config::AppConfig;
use crate::orders::{AccountReader, OrderService, OrderStore, PgAccountReader, PgOrderStore};
use crate::pricing::{ComponentAssembler, PgPriceMatrix, PriceMatrix, PriceResolver};

/// Storage backends the services are wired over
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogReader>,
    pub prices: Arc<dyn PriceMatrix>,
    pub carts: Arc<dyn CartStore>,
    pub calendar: Arc<dyn CalendarStore>,
    pub orders: Arc<dyn OrderStore>,
    pub accounts: Arc<dyn AccountReader>,
}

impl Stores {
    /// Postgres implementations sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            catalog: Arc::new(PgCatalogReader::new(pool.clone())),
            prices: Arc::new(PgPriceMatrix::new(pool.clone())),
            carts: Arc::new(PgCartStore::new(pool.clone())),
            calendar: Arc::new(PgCalendarStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
            accounts: Arc::new(PgAccountReader::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub resolver: PriceResolver,
    pub cart_aggregator: Arc<CartAggregator>,
    pub cart_service: Arc<CartService>,
    pub calendar_service: Arc<CalendarService>,
    pub order_service: Arc<OrderService>,
}

impl AppState {
    pub fn from_pool(pool: PgPool, config: AppConfig) -> Self {
        Self::from_stores(Stores::postgres(pool), config)
    }

    /// Wire every service over the given stores
    pub fn from_stores(stores: Stores, config: AppConfig) -> Self {
        let resolver = PriceResolver::new(stores.prices.clone(), stores.catalog.clone());
        let assembler = ComponentAssembler::new(stores.catalog.clone(), resolver.clone());
        let calendar = CalendarService::new(stores.calendar.clone(), config.business_offset);

        let cart_aggregator = CartAggregator::new(
            stores.carts.clone(),
            stores.catalog.clone(),
            assembler.clone(),
        );
        let cart_service = CartService::new(stores.carts.clone(), assembler.clone());
        let order_service = OrderService::new(
            stores.orders,
            stores.accounts,
            stores.carts,
            stores.catalog,
            assembler,
            calendar.clone(),
        );

        Self {
            tokens: TokenService::new(config.jwt_secret.clone()),
            config: Arc::new(config),
            resolver,
            cart_aggregator: Arc::new(cart_aggregator),
            cart_service: Arc::new(cart_service),
            calendar_service: Arc::new(calendar),
            order_service: Arc::new(order_service),
        }
    }
}

/// Handler for GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/prices/:kind/:entity_id",
            get(pricing::resolve_price_handler),
        )
        .route(
            "/api/cart",
            get(cart::get_cart_handler).post(cart::add_cart_line_handler),
        )
        .route(
            "/api/cart/bulk-delete",
            post(cart::bulk_delete_cart_lines_handler),
        )
        .route(
            "/api/cart/:line_id",
            patch(cart::update_cart_line_handler).delete(cart::delete_cart_line_handler),
        )
        .route(
            "/api/orders",
            post(orders::place_order_handler).get(orders::get_order_history_handler),
        )
        .route("/api/orders/:order_id", get(orders::get_order_by_id_handler))
        .route(
            "/api/orders/:order_id/cancel",
            post(orders::cancel_order_handler),
        )
        .route(
            "/api/admin/orders/:order_id/status",
            patch(orders::change_order_status_handler),
        )
        .route(
            "/api/admin/orders/:order_id/refuse",
            post(orders::refuse_order_handler),
        )
        .route("/api/calendar", get(calendar::get_calendar_handler))
        .route(
            "/api/calendar/delivery-estimate",
            get(calendar::delivery_estimate_handler),
        )
        .route("/api/admin/calendar", put(calendar::update_calendar_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
