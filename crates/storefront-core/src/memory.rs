//! In-memory [`CartBackend`] for local runs and tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::{CommerceError, Result};
use crate::ports::CartBackend;
use crate::types::{CartId, CartSnapshot, ProductId, SessionToken};

/// Keeps every cart in process memory.
///
/// Each cart sits behind its own mutex, so mutations of one cart are applied
/// one at a time while different carts proceed independently.
#[derive(Default)]
pub struct InMemoryCartBackend {
    carts: RwLock<HashMap<CartId, Arc<Mutex<CartSnapshot>>>>,
    /// Accepted product ids; `None` accepts any id.
    catalog: Option<BTreeSet<ProductId>>,
}

impl InMemoryCartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the backend to a known set of products.
    pub fn with_catalog<I, P>(products: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        Self {
            carts: RwLock::new(HashMap::new()),
            catalog: Some(products.into_iter().map(Into::into).collect()),
        }
    }

    /// Backend-side view of a cart.
    pub async fn cart(&self, cart_id: CartId) -> Option<CartSnapshot> {
        let record = self.carts.read().await.get(&cart_id).cloned()?;
        let snapshot = record.lock().await.clone();
        Some(snapshot)
    }

    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }

    async fn record(&self, cart_id: CartId) -> Result<Arc<Mutex<CartSnapshot>>> {
        self.carts
            .read()
            .await
            .get(&cart_id)
            .cloned()
            .ok_or(CommerceError::CartNotFound(cart_id))
    }

    fn check_product(&self, product_id: &ProductId) -> Result<()> {
        match &self.catalog {
            Some(known) if !known.contains(product_id) => {
                Err(CommerceError::ProductNotFound(product_id.clone()))
            }
            _ => Ok(()),
        }
    }
}

fn check_owner(current: &CartSnapshot, session_token: &SessionToken) -> Result<()> {
    if current.session_token() == session_token {
        Ok(())
    } else {
        Err(CommerceError::SessionMismatch(current.cart_id()))
    }
}

#[async_trait]
impl CartBackend for InMemoryCartBackend {
    async fn create_cart(&self) -> Result<CartSnapshot> {
        let snapshot = CartSnapshot::empty(CartId::new(), SessionToken::generate());
        self.carts.write().await.insert(
            snapshot.cart_id(),
            Arc::new(Mutex::new(snapshot.clone())),
        );
        tracing::debug!(cart_id = %snapshot.cart_id(), "Created cart");
        Ok(snapshot)
    }

    async fn add_product_to_cart(
        &self,
        cart_id: CartId,
        session_token: &SessionToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        self.check_product(product_id)?;

        let record = self.record(cart_id).await?;
        let mut current = record.lock().await;
        check_owner(&current, session_token)?;

        // Each line is bounded by the total, so a total that fits means the
        // line fits too.
        current
            .total_count()
            .checked_add(quantity)
            .ok_or(CommerceError::InvalidQuantity(quantity))?;

        let mut lines = current.lines().clone();
        *lines.entry(product_id.clone()).or_insert(0) += quantity;

        *current = current.successor(lines)?;
        tracing::debug!(
            cart_id = %cart_id,
            product_id = %product_id,
            version = current.version(),
            count = current.total_count(),
            "Added product to cart"
        );
        Ok(current.clone())
    }

    async fn remove_product_from_cart(
        &self,
        cart_id: CartId,
        session_token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<CartSnapshot> {
        let record = self.record(cart_id).await?;
        let mut current = record.lock().await;
        check_owner(&current, session_token)?;

        let mut lines = current.lines().clone();
        let removed = lines.remove(product_id);

        *current = current.successor(lines)?;
        tracing::debug!(
            cart_id = %cart_id,
            product_id = %product_id,
            removed = removed.unwrap_or(0),
            count = current.total_count(),
            "Removed product from cart"
        );
        Ok(current.clone())
    }

    async fn discard_cart(&self, cart_id: CartId) -> Result<()> {
        if self.carts.write().await.remove(&cart_id).is_some() {
            tracing::debug!(cart_id = %cart_id, "Discarded cart");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_accumulates_quantity_per_product() {
        let backend = InMemoryCartBackend::new();
        let cart = backend.create_cart().await.unwrap();
        let p1 = ProductId::from("p1");

        backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &p1, 1)
            .await
            .unwrap();
        let snap = backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &p1, 2)
            .await
            .unwrap();

        assert_eq!(snap.quantity_of(&p1), 3);
        assert_eq!(snap.total_count(), 3);
        assert_eq!(snap.version(), 2);
    }

    #[tokio::test]
    async fn remove_drops_whole_line_and_absent_is_noop() {
        let backend = InMemoryCartBackend::new();
        let cart = backend.create_cart().await.unwrap();
        let p1 = ProductId::from("p1");
        backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &p1, 2)
            .await
            .unwrap();

        let snap = backend
            .remove_product_from_cart(cart.cart_id(), cart.session_token(), &p1)
            .await
            .unwrap();
        assert!(snap.is_empty());

        let again = backend
            .remove_product_from_cart(cart.cart_id(), cart.session_token(), &p1)
            .await
            .unwrap();
        assert_eq!(again.total_count(), 0);
        assert_eq!(again.version(), snap.version() + 1);
    }

    #[tokio::test]
    async fn unknown_product_rejected_with_catalog() {
        let backend = InMemoryCartBackend::with_catalog(["p1"]);
        let cart = backend.create_cart().await.unwrap();
        let err = backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &"nope".into(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn foreign_session_token_rejected() {
        let backend = InMemoryCartBackend::new();
        let cart = backend.create_cart().await.unwrap();
        let err = backend
            .add_product_to_cart(cart.cart_id(), &SessionToken::generate(), &"p1".into(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::SessionMismatch(_)));
    }

    #[tokio::test]
    async fn unknown_cart_and_zero_quantity_rejected() {
        let backend = InMemoryCartBackend::new();
        let err = backend
            .remove_product_from_cart(CartId::new(), &SessionToken::generate(), &"p1".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::CartNotFound(_)));

        let cart = backend.create_cart().await.unwrap();
        let err = backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &"p1".into(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidQuantity(0)));
    }

    #[tokio::test]
    async fn cart_total_overflow_rejected_without_change() {
        let backend = InMemoryCartBackend::new();
        let cart = backend.create_cart().await.unwrap();
        backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &"a".into(), u32::MAX)
            .await
            .unwrap();

        let err = backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), &"b".into(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidQuantity(1)));

        let stored = backend.cart(cart.cart_id()).await.unwrap();
        assert_eq!(stored.total_count(), u32::MAX);
        assert_eq!(stored.version(), 1);
        assert!(!stored.contains(&"b".into()));
    }

    #[tokio::test]
    async fn discard_cart_forgets_it() {
        let backend = InMemoryCartBackend::new();
        let keep = backend.create_cart().await.unwrap();
        let gone = backend.create_cart().await.unwrap();

        backend.discard_cart(gone.cart_id()).await.unwrap();
        // unknown ids are fine
        backend.discard_cart(gone.cart_id()).await.unwrap();

        assert_eq!(backend.cart_count().await, 1);
        assert!(backend.cart(gone.cart_id()).await.is_none());
        assert!(backend.cart(keep.cart_id()).await.is_some());
        let err = backend
            .remove_product_from_cart(gone.cart_id(), gone.session_token(), &"p1".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::CartNotFound(_)));
    }
}
