//! Storefront Web Server
//!
//! Serves the AJAX cart endpoints and the product listing API.
//! Configuration is read from the environment (and `.env`); see `config.rs`.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_server::{build_router, sessions::run_session_reaper, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront server");

    let config = ServerConfig::from_env();
    tracing::debug!(?config, "Loaded configuration");

    let state = AppState::from_config(&config);

    match config.session_idle {
        Some(max_idle) => {
            let registry = state.sessions.clone();
            let cart = state.cart.clone();
            let every = config.purge_interval;
            tokio::spawn(async move {
                run_session_reaper(registry, cart, max_idle, every).await;
            });
            tracing::info!(
                "Session reaper spawned (idle={}s, interval={}s)",
                max_idle.as_secs(),
                every.as_secs()
            );
        }
        None => tracing::info!("Session expiry disabled"),
    }

    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    tracing::info!("Storefront listening on http://{}", config.bind_addr);
    tracing::info!("  /ajax/cart/addProduct/:id     - add to cart");
    tracing::info!("  /ajax/cart/removeProduct/:id  - remove from cart");
    tracing::info!("  /api/cart                     - cart contents");
    tracing::info!("  /api/listing                  - product listing");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
