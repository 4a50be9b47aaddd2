//! Cart mutations triggered by AJAX requests.
//!
//! Each operation is a read-modify-write against the session binding:
//! read the bound snapshot (creating a cart if there is none), call the
//! backend, store what the backend returned. Concurrent requests from the
//! same session are not coordinated here. Both read the binding, both call
//! the backend, and whichever `put` lands last stays bound. The backend owns
//! line-item quantities per cart id, so no operation is lost on the backend
//! side; only the session's cached snapshot may briefly lag.

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use crate::error::Result;
use crate::ports::CartBackend;
use crate::session::{BrowsingSession, CartSessionStore};
use crate::types::{CartId, CartSnapshot, ProductId};

/// Result of a cart operation as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// No cart backend is configured. Not an error.
    Disabled,
    /// New total item count of the session's cart.
    Count(u32),
}

impl CartOutcome {
    pub fn count(&self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Count(n) => *n,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl fmt::Display for CartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

pub struct CartOperationHandler {
    backend: Option<Arc<dyn CartBackend>>,
    store: CartSessionStore,
}

impl CartOperationHandler {
    pub fn new(backend: Arc<dyn CartBackend>) -> Self {
        Self::with_backend(Some(backend))
    }

    /// Handler for a storefront running without a cart backend.
    pub fn disabled() -> Self {
        Self::with_backend(None)
    }

    pub fn with_backend(backend: Option<Arc<dyn CartBackend>>) -> Self {
        Self {
            backend,
            store: CartSessionStore,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Add one unit of `product_id` to the session's cart.
    ///
    /// A cart created here stays bound even if the add itself fails. On
    /// backend failure the binding is left as it was before that call.
    #[instrument(skip(self, session, product_id), fields(session_id = %session.id(), product_id = %product_id))]
    pub async fn add_product(
        &self,
        session: &BrowsingSession,
        product_id: &ProductId,
    ) -> Result<CartOutcome> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(CartOutcome::Disabled);
        };

        let cart = match self.store.get(session).await {
            Some(cart) => cart,
            None => self.create_and_bind(backend, session).await?,
        };

        let updated = backend
            .add_product_to_cart(cart.cart_id(), cart.session_token(), product_id, 1)
            .await?;
        Ok(self.bind(session, updated).await)
    }

    /// Remove the line for `product_id` from the session's cart.
    ///
    /// Without a bound cart an empty one is created and bound, and no removal
    /// is attempted.
    #[instrument(skip(self, session, product_id), fields(session_id = %session.id(), product_id = %product_id))]
    pub async fn remove_product(
        &self,
        session: &BrowsingSession,
        product_id: &ProductId,
    ) -> Result<CartOutcome> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(CartOutcome::Disabled);
        };

        let Some(cart) = self.store.get(session).await else {
            let created = self.create_and_bind(backend, session).await?;
            return Ok(CartOutcome::Count(created.total_count()));
        };

        let updated = backend
            .remove_product_from_cart(cart.cart_id(), cart.session_token(), product_id)
            .await?;
        Ok(self.bind(session, updated).await)
    }

    /// Unbind the session's cart and discard it on the backend. Used when a
    /// session expires; answers the discarded cart id, if any.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub async fn release(&self, session: &BrowsingSession) -> Result<Option<CartId>> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(None);
        };
        let Some(cart) = self.store.take(session).await else {
            return Ok(None);
        };
        backend.discard_cart(cart.cart_id()).await?;
        Ok(Some(cart.cart_id()))
    }

    /// Snapshot currently bound to the session. Never creates a cart.
    pub async fn current_cart(&self, session: &BrowsingSession) -> Option<Arc<CartSnapshot>> {
        if !self.is_enabled() {
            return None;
        }
        self.store.get(session).await
    }

    async fn create_and_bind(
        &self,
        backend: &dyn CartBackend,
        session: &BrowsingSession,
    ) -> Result<Arc<CartSnapshot>> {
        let created = Arc::new(backend.create_cart().await?);
        self.store.put(session, Arc::clone(&created)).await;
        tracing::info!(cart_id = %created.cart_id(), "Bound new cart to session");
        Ok(created)
    }

    async fn bind(&self, session: &BrowsingSession, snapshot: CartSnapshot) -> CartOutcome {
        let count = snapshot.total_count();
        tracing::debug!(
            cart_id = %snapshot.cart_id(),
            version = snapshot.version(),
            count,
            "Storing cart snapshot"
        );
        self.store.put(session, Arc::new(snapshot)).await;
        CartOutcome::Count(count)
    }
}
