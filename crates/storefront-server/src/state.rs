//! Shared application state

use std::sync::Arc;

use storefront_core::{
    CartBackend, CartOperationHandler, CatalogQueryExecutor, InMemoryCartBackend, InMemoryCatalog,
    Product, SessionRegistry,
};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub cart: Arc<CartOperationHandler>,
    pub catalog: Arc<dyn CatalogQueryExecutor>,
    pub session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(
        cart: CartOperationHandler,
        catalog: Arc<dyn CatalogQueryExecutor>,
        session_cookie: &str,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            cart: Arc::new(cart),
            catalog,
            session_cookie: Arc::from(session_cookie),
        }
    }

    /// Wire in-memory collaborators according to `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let backend: Option<Arc<dyn CartBackend>> = if config.cart_enabled {
            let backend = if config.catalog_products.is_empty() {
                InMemoryCartBackend::new()
            } else {
                InMemoryCartBackend::with_catalog(config.catalog_products.iter().map(String::as_str))
            };
            Some(Arc::new(backend))
        } else {
            tracing::warn!("Cart backend disabled; cart endpoints will answer 0");
            None
        };

        Self::new(
            CartOperationHandler::with_backend(backend),
            Arc::new(demo_catalog()),
            &config.session_cookie,
        )
    }
}

/// Small seeded catalog served by `/api/listing`.
pub fn demo_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Product::new("trail-boot", "Trail Boot", "shoes")
            .with_attribute("color", "brown")
            .with_attribute("brand", "acme"),
        Product::new("city-boot", "City Boot", "shoes")
            .with_attribute("color", "black")
            .with_attribute("brand", "acme"),
        Product::new("sandal", "Beach Sandal", "shoes")
            .with_attribute("color", "brown")
            .with_attribute("brand", "solana"),
        Product::new("rain-jacket", "Rain Jacket", "outerwear")
            .with_attribute("color", "black")
            .with_attribute("brand", "nimbus"),
        Product::new("fleece", "Fleece Pullover", "outerwear")
            .with_attribute("color", "green")
            .with_attribute("brand", "nimbus"),
    ])
}
