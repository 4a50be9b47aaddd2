use thiserror::Error;

use crate::types::{CartId, ProductId};

/// Failures reported by a [`CartBackend`](crate::ports::CartBackend).
///
/// A missing backend is not represented here. That case is the
/// feature-disabled path and yields [`CartOutcome::Disabled`](crate::cart::CartOutcome).
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("cart not found: {0}")]
    CartNotFound(CartId),

    #[error("session token does not own cart {0}")]
    SessionMismatch(CartId),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    #[error("commerce backend unavailable: {0}")]
    Unavailable(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CommerceError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ProductNotFound(_) => 404,
            Self::CartNotFound(_) => 404,
            Self::SessionMismatch(_) => 403,
            Self::InvalidQuantity(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommerceError>;
