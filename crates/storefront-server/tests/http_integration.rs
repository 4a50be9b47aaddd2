//! HTTP-level integration tests for the storefront server.
//!
//! Drives the full router in-process; no network or external services.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use storefront_core::{CartOperationHandler, InMemoryCartBackend};
use storefront_server::state::demo_catalog;
use storefront_server::{build_router, AppState};
use tower::ServiceExt;

const COOKIE: &str = "TEST_SESSION";

// ── Test app builders ──────────────────────────────────────────

fn app_with(cart: CartOperationHandler) -> (Router, AppState) {
    let state = AppState::new(cart, Arc::new(demo_catalog()), COOKIE);
    (build_router(state.clone()), state)
}

fn enabled_app() -> (Router, AppState) {
    app_with(CartOperationHandler::new(Arc::new(InMemoryCartBackend::new())))
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: String,
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Reply {
    let mut req = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let resp = app
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    Reply {
        status,
        set_cookie,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// `NAME=value` part of a Set-Cookie header, usable as a Cookie header.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

// ── Cart endpoints ─────────────────────────────────────────────

#[tokio::test]
async fn add_and_remove_track_count_across_requests() {
    let (app, _) = enabled_app();

    let first = get(&app, "/ajax/cart/addProduct/p1", None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, "1");
    let cookie = cookie_pair(&first.set_cookie.expect("session cookie issued"));
    assert!(cookie.starts_with("TEST_SESSION="));

    let second = get(&app, "/ajax/cart/addProduct/p2", Some(&cookie)).await;
    assert_eq!(second.body, "2");
    assert!(second.set_cookie.is_none());

    let removed = get(&app, "/ajax/cart/removeProduct/p1", Some(&cookie)).await;
    assert_eq!(removed.body, "1");

    let again = get(&app, "/ajax/cart/removeProduct/p1", Some(&cookie)).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body, "1");
}

#[tokio::test]
async fn sessions_do_not_share_carts() {
    let (app, state) = enabled_app();

    let a = get(&app, "/ajax/cart/addProduct/p1", None).await;
    let b = get(&app, "/ajax/cart/addProduct/p1", None).await;
    assert_eq!(a.body, "1");
    assert_eq!(b.body, "1");
    assert_ne!(a.set_cookie, b.set_cookie);
    assert_eq!(state.sessions.len().await, 2);
}

#[tokio::test]
async fn remove_on_fresh_session_answers_zero() {
    let (app, _) = enabled_app();
    let reply = get(&app, "/ajax/cart/removeProduct/p1", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "0");

    let cookie = cookie_pair(&reply.set_cookie.unwrap());
    let view = get(&app, "/api/cart", Some(&cookie)).await;
    let json: serde_json::Value = serde_json::from_str(&view.body).unwrap();
    assert!(json["cart_id"].is_string());
    assert_eq!(json["total_count"], 0);
}

#[tokio::test]
async fn disabled_cart_answers_zero_without_session() {
    let (app, state) = app_with(CartOperationHandler::disabled());

    let added = get(&app, "/ajax/cart/addProduct/p1", None).await;
    let removed = get(&app, "/ajax/cart/removeProduct/p1", None).await;

    for reply in [&added, &removed] {
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, "0");
        assert!(reply.set_cookie.is_none());
    }
    assert!(state.sessions.is_empty().await);

    let view = get(&app, "/api/cart", None).await;
    let json: serde_json::Value = serde_json::from_str(&view.body).unwrap();
    assert_eq!(json["enabled"], false);
    assert!(json["cart_id"].is_null());
}

#[tokio::test]
async fn commerce_failure_is_server_error_and_keeps_created_cart() {
    let (app, _) = app_with(CartOperationHandler::new(Arc::new(
        InMemoryCartBackend::with_catalog(["p1"]),
    )));

    let failed = get(&app, "/ajax/cart/addProduct/unknown", None).await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.body, "product not found: unknown");
    let cookie = cookie_pair(&failed.set_cookie.expect("cookie sent on failure"));

    let view = get(&app, "/api/cart", Some(&cookie)).await;
    let json: serde_json::Value = serde_json::from_str(&view.body).unwrap();
    assert!(json["cart_id"].is_string());
    assert_eq!(json["total_count"], 0);

    let ok = get(&app, "/ajax/cart/addProduct/p1", Some(&cookie)).await;
    assert_eq!(ok.body, "1");
    let view = get(&app, "/api/cart", Some(&cookie)).await;
    let after: serde_json::Value = serde_json::from_str(&view.body).unwrap();
    assert_eq!(after["cart_id"], json["cart_id"]);
    assert_eq!(after["lines"]["p1"], 1);
}

#[tokio::test]
async fn cart_view_without_session_is_empty() {
    let (app, state) = enabled_app();
    let view = get(&app, "/api/cart", None).await;
    assert_eq!(view.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&view.body).unwrap();
    assert_eq!(json["enabled"], true);
    assert_eq!(json["total_count"], 0);
    assert!(state.sessions.is_empty().await);
}

// ── Listing endpoint ───────────────────────────────────────────

#[tokio::test]
async fn listing_applies_widget_contributions() {
    let (app, _) = enabled_app();
    let reply = get(
        &app,
        "/api/listing?category=shoes&facet=color:brown&facet=brand:acme&store_link=true",
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["products"][0]["id"], "trail-boot");
    assert_eq!(json["include_store_link"], true);
    assert!(json.get("facets").is_none());
}

#[tokio::test]
async fn listing_term_paging_and_counts() {
    let (app, _) = enabled_app();
    let reply = get(&app, "/api/listing?term=boot&size=1&start=1&facet_counts=1", None).await;
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["products"].as_array().unwrap().len(), 1);
    assert_eq!(json["facets"]["brand"]["acme"], 2);
}

#[tokio::test]
async fn listing_rejects_bad_parameters() {
    let (app, _) = enabled_app();
    let reply = get(&app, "/api/listing?size=lots", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["error"], "bad request: size must be a non-negative integer");
    assert!(json.get("commerce_status").is_none());

    let reply = get(&app, "/api/listing?facet=colorbrown", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_ok() {
    let (app, _) = enabled_app();
    let reply = get(&app, "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ok");
}
