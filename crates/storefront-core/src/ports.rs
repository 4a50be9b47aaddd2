//! Port traits for the external commerce collaborators.
//!
//! The cart handler and the listing renderer operate exclusively through these
//! traits, so the in-memory implementations in [`crate::memory`] and
//! [`crate::catalog`] can be swapped for a real commerce platform.

use async_trait::async_trait;

use crate::catalog::QueryResult;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::types::{CartId, CartSnapshot, ProductId, SessionToken};

/// Cart bookkeeping owned by the commerce platform.
///
/// The backend is the source of truth for line-item quantities. Implementations
/// must serialize mutations per `cart_id`; callers do not lock.
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn create_cart(&self) -> Result<CartSnapshot>;

    async fn add_product_to_cart(
        &self,
        cart_id: CartId,
        session_token: &SessionToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot>;

    /// Removes the whole line for `product_id`. Removing an absent product
    /// succeeds and returns the unchanged lines.
    async fn remove_product_from_cart(
        &self,
        cart_id: CartId,
        session_token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<CartSnapshot>;

    /// Forget a cart whose session has ended. Unknown ids succeed.
    async fn discard_cart(&self, cart_id: CartId) -> Result<()>;
}

/// Executes a finished query. Takes the builder by value: a builder is
/// consumed exactly once.
#[async_trait]
pub trait CatalogQueryExecutor: Send + Sync {
    async fn execute(&self, query: QueryBuilder) -> Result<QueryResult>;
}
