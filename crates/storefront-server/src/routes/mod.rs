pub mod cart;
pub mod listing;

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
