//! Browsing sessions and the cart binding stored on them.
//!
//! ```text
//! SessionRegistry  (Arc<RwLock<HashMap<Uuid, Arc<BrowsingSession>>>>)
//!        │
//!        ▼
//! BrowsingSession  (RwLock<HashMap<String, Attribute>>)
//!        │  CART_SESSION_KEY
//!        ▼
//! Arc<CartSnapshot>   read/written only through CartSessionStore
//! ```
//!
//! The registry stands in for the hosting infrastructure's session layer:
//! it hands out sessions and expires idle ones. Each attribute read or write
//! takes the session's lock for exactly one map operation, so a reader sees
//! either the previous snapshot or the new one, never a partial write.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::CartSnapshot;

/// Session attribute key under which the cart snapshot is bound.
///
/// Changing this value orphans every live cart.
pub const CART_SESSION_KEY: &str = "storefront.cart";

/// Type-erased session attribute value.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Per-visitor session: an id plus a typed attribute map.
pub struct BrowsingSession {
    id: Uuid,
    attributes: RwLock<HashMap<String, Attribute>>,
    last_seen_ms: AtomicI64,
}

impl BrowsingSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            attributes: RwLock::new(HashMap::new()),
            last_seen_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Typed attribute lookup. Returns `None` when the key is unset or holds
    /// a value of another type.
    pub async fn attribute<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let value = self.attributes.read().await.get(key).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Replace the attribute under `key`, returning the previous value.
    pub async fn set_attribute<T>(&self, key: &str, value: Arc<T>) -> Option<Attribute>
    where
        T: Any + Send + Sync,
    {
        self.attributes
            .write()
            .await
            .insert(key.to_string(), value as Attribute)
    }

    pub async fn remove_attribute(&self, key: &str) -> Option<Attribute> {
        self.attributes.write().await.remove(key)
    }

    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.last_seen_ms.load(Ordering::Relaxed))
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_seen()).to_std().unwrap_or(Duration::ZERO)
    }
}

impl Default for BrowsingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BrowsingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowsingSession")
            .field("id", &self.id)
            .field("last_seen", &self.last_seen())
            .finish_non_exhaustive()
    }
}

/// Binds one [`CartSnapshot`] per session under [`CART_SESSION_KEY`].
///
/// No merging and no locking beyond the session's own attribute lock:
/// `put` replaces the binding unconditionally and the last `put` wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartSessionStore;

impl CartSessionStore {
    pub async fn get(&self, session: &BrowsingSession) -> Option<Arc<CartSnapshot>> {
        session.attribute::<CartSnapshot>(CART_SESSION_KEY).await
    }

    pub async fn put(&self, session: &BrowsingSession, snapshot: Arc<CartSnapshot>) {
        session.set_attribute(CART_SESSION_KEY, snapshot).await;
    }

    /// Unbind and return the session's cart snapshot.
    pub async fn take(&self, session: &BrowsingSession) -> Option<Arc<CartSnapshot>> {
        let value = session.remove_attribute(CART_SESSION_KEY).await?;
        value.downcast::<CartSnapshot>().ok()
    }
}

/// Shared map of live sessions
type SessionMap = Arc<RwLock<HashMap<Uuid, Arc<BrowsingSession>>>>;

/// All live browsing sessions, keyed by session id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: SessionMap,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<BrowsingSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Resolve a session from a client-supplied id, creating a fresh session
    /// (with a new id) when the id is missing or unknown.
    ///
    /// Returns the session and whether it was newly created.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Arc<BrowsingSession>, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                session.touch();
                return (session, false);
            }
        }

        let session = Arc::new(BrowsingSession::new());
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        tracing::debug!(session_id = %session.id(), "Created browsing session");
        (session, true)
    }

    pub async fn remove(&self, id: Uuid) -> Option<Arc<BrowsingSession>> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`. Their attributes,
    /// including any bound cart snapshot, go with them.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        self.drain_idle(max_idle).await.len()
    }

    /// Like [`purge_idle`](Self::purge_idle), but hands back the removed
    /// sessions so their backend state can be released.
    pub async fn drain_idle(&self, max_idle: Duration) -> Vec<Arc<BrowsingSession>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, session)| session.idle_for(now) > max_idle)
            .map(|(id, _)| *id)
            .collect();
        expired
            .iter()
            .filter_map(|id| sessions.remove(id))
            .collect()
    }
}
