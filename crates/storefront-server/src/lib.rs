//! storefront-server: axum surface over `storefront-core`.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, JsonError};
pub use router::build_router;
pub use state::AppState;
