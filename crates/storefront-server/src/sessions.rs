//! Cookie-based session resolution and idle-session expiry.

use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use storefront_core::{BrowsingSession, CartOperationHandler, SessionRegistry};
use uuid::Uuid;

/// Session id carried in the named cookie, if present and well-formed.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// A resolved session plus the cookie to send back when it was just created.
pub struct ResolvedSession {
    pub session: Arc<BrowsingSession>,
    pub set_cookie: Option<HeaderValue>,
}

impl ResolvedSession {
    /// Attach the session cookie to `response` when one is pending.
    pub fn apply(&self, mut response: Response) -> Response {
        if let Some(cookie) = &self.set_cookie {
            response.headers_mut().append(SET_COOKIE, cookie.clone());
        }
        response
    }
}

pub async fn resolve_session(
    registry: &SessionRegistry,
    headers: &HeaderMap,
    cookie_name: &str,
) -> ResolvedSession {
    let requested = session_id_from_headers(headers, cookie_name);
    let (session, created) = registry.get_or_create(requested).await;
    let set_cookie = if created {
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            cookie_name,
            session.id()
        ))
        .ok()
    } else {
        None
    };
    ResolvedSession {
        session,
        set_cookie,
    }
}

/// Existing session only; never creates one. A hit counts as activity.
pub async fn existing_session(
    registry: &SessionRegistry,
    headers: &HeaderMap,
    cookie_name: &str,
) -> Option<Arc<BrowsingSession>> {
    let id = session_id_from_headers(headers, cookie_name)?;
    let session = registry.get(id).await?;
    session.touch();
    Some(session)
}

/// Drop sessions idle for longer than `max_idle` and discard their carts.
/// Returns how many sessions expired.
pub async fn reap_idle_sessions(
    registry: &SessionRegistry,
    cart: &CartOperationHandler,
    max_idle: Duration,
) -> usize {
    let expired = registry.drain_idle(max_idle).await;
    for session in &expired {
        if let Err(e) = cart.release(session).await {
            tracing::warn!(session_id = %session.id(), error = %e, "Failed to discard expired cart");
        }
    }
    expired.len()
}

/// Periodically run [`reap_idle_sessions`].
pub async fn run_session_reaper(
    registry: SessionRegistry,
    cart: Arc<CartOperationHandler>,
    max_idle: Duration,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let purged = reap_idle_sessions(&registry, &cart, max_idle).await;
        if purged > 0 {
            let remaining = registry.len().await;
            tracing::info!(purged, remaining, "Expired idle sessions");
        }
    }
}
