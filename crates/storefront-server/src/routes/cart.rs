//! Cart AJAX Routes
//!
//! ## Endpoints
//!
//! - `GET /ajax/cart/addProduct/:product_id` - Add one unit, answer new count as text
//! - `GET /ajax/cart/removeProduct/:product_id` - Remove the line, answer new count as text
//! - `GET /api/cart` - JSON view of the session's cart
//!
//! Both AJAX routes answer `0` without touching any session when the cart
//! backend is disabled. Commerce failures answer 500.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storefront_core::{CartId, CartOutcome, ProductId, Result as CommerceResult};

use crate::error::AppError;
use crate::sessions::{existing_session, resolve_session};
use crate::state::AppState;

// =============================================================================
// RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CartView {
    pub enabled: bool,
    pub cart_id: Option<CartId>,
    pub version: Option<u64>,
    pub total_count: u32,
    pub lines: BTreeMap<ProductId, u32>,
}

#[derive(Debug, Clone, Copy)]
enum CartOp {
    Add,
    Remove,
}

// =============================================================================
// ROUTE HANDLERS
// =============================================================================

/// GET /ajax/cart/addProduct/:product_id
pub async fn add_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run_cart_op(state, headers, ProductId::from(product_id), CartOp::Add).await
}

/// GET /ajax/cart/removeProduct/:product_id
pub async fn remove_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run_cart_op(state, headers, ProductId::from(product_id), CartOp::Remove).await
}

async fn run_cart_op(
    state: AppState,
    headers: HeaderMap,
    product_id: ProductId,
    op: CartOp,
) -> Response {
    if !state.cart.is_enabled() {
        return CartOutcome::Disabled.to_string().into_response();
    }

    let resolved = resolve_session(&state.sessions, &headers, &state.session_cookie).await;
    let result: CommerceResult<CartOutcome> = match op {
        CartOp::Add => state.cart.add_product(&resolved.session, &product_id).await,
        CartOp::Remove => state.cart.remove_product(&resolved.session, &product_id).await,
    };

    // The cookie goes out on failure too: a cart created before the failed
    // call is already bound to this session.
    let response = match result {
        Ok(outcome) => outcome.to_string().into_response(),
        Err(e) => AppError::from(e).into_response(),
    };
    resolved.apply(response)
}

/// GET /api/cart
pub async fn cart_view(State(state): State<AppState>, headers: HeaderMap) -> Json<CartView> {
    let enabled = state.cart.is_enabled();
    let session = existing_session(&state.sessions, &headers, &state.session_cookie).await;
    let snapshot = match session {
        Some(session) => state.cart.current_cart(&session).await,
        None => None,
    };

    Json(match snapshot {
        Some(cart) => CartView {
            enabled,
            cart_id: Some(cart.cart_id()),
            version: Some(cart.version()),
            total_count: cart.total_count(),
            lines: cart.lines().clone(),
        },
        None => CartView {
            enabled,
            cart_id: None,
            version: None,
            total_count: 0,
            lines: BTreeMap::new(),
        },
    })
}
