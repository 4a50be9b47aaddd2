//! Server configuration, loaded once at startup from environment variables.
//!
//!   STOREFRONT_BIND_ADDR                   - listen address (default: 0.0.0.0:3000)
//!   STOREFRONT_CART_ENABLED                - run with a cart backend (default: true)
//!   STOREFRONT_SESSION_COOKIE              - session cookie name (default: STOREFRONT_SESSION)
//!   STOREFRONT_SESSION_IDLE_SECS           - idle session expiry, 0 disables (default: 1800)
//!   STOREFRONT_SESSION_PURGE_INTERVAL_SECS - expiry sweep interval (default: 60)
//!   STOREFRONT_CATALOG_PRODUCTS            - comma-separated product ids the cart accepts
//!                                            (default: empty, accept any id)

use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_COOKIE: &str = "STOREFRONT_SESSION";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub cart_enabled: bool,
    pub session_cookie: String,
    /// `None` keeps sessions until restart.
    pub session_idle: Option<Duration>,
    pub purge_interval: Duration,
    pub catalog_products: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup("STOREFRONT_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid STOREFRONT_BIND_ADDR {:?}, using default {}: {}",
                    raw,
                    DEFAULT_BIND_ADDR,
                    e
                );
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let idle_secs = parse_or(&lookup, "STOREFRONT_SESSION_IDLE_SECS", 1800u64);
        let purge_secs = parse_or(&lookup, "STOREFRONT_SESSION_PURGE_INTERVAL_SECS", 60u64);

        let catalog_products = lookup("STOREFRONT_CATALOG_PRODUCTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bind_addr,
            cart_enabled: env_bool(&lookup, "STOREFRONT_CART_ENABLED", true),
            session_cookie: lookup("STOREFRONT_SESSION_COOKIE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            session_idle: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            purge_interval: Duration::from_secs(purge_secs.max(1)),
            catalog_products,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        None => default,
    }
}
