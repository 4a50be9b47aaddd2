//! Router construction for the storefront server.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // AJAX cart endpoints (plain-text counts)
        .route(
            "/ajax/cart/addProduct/:product_id",
            get(routes::cart::add_product),
        )
        .route(
            "/ajax/cart/removeProduct/:product_id",
            get(routes::cart::remove_product),
        )
        .route("/api/cart", get(routes::cart::cart_view))
        .route("/api/listing", get(routes::listing::listing))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
