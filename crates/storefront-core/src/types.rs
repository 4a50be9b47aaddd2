//! Identity newtypes and the immutable cart snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CommerceError, Result};

/// Opaque cart identity, stable for the life of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub Uuid);

impl CartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Backend-issued token binding a cart to the browsing session that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cart state at one point in time.
///
/// Snapshots are never mutated in place; every backend mutation returns a new
/// one. `total_count` is always the sum of `lines`, and a line with quantity 0
/// is dropped on construction. Deserialization goes through the same
/// constructor, so a serialized `total_count` is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartSnapshotRepr")]
pub struct CartSnapshot {
    cart_id: CartId,
    session_token: SessionToken,
    version: u64,
    lines: BTreeMap<ProductId, u32>,
    total_count: u32,
    updated_at: DateTime<Utc>,
}

impl CartSnapshot {
    /// A freshly created cart: no lines, version 0.
    pub fn empty(cart_id: CartId, session_token: SessionToken) -> Self {
        Self {
            cart_id,
            session_token,
            version: 0,
            lines: BTreeMap::new(),
            total_count: 0,
            updated_at: Utc::now(),
        }
    }

    /// Fails with [`CommerceError::InvalidQuantity`] when the line quantities
    /// do not fit in a `u32` total.
    pub fn from_lines(
        cart_id: CartId,
        session_token: SessionToken,
        version: u64,
        mut lines: BTreeMap<ProductId, u32>,
    ) -> Result<Self> {
        lines.retain(|_, qty| *qty > 0);
        let total_count = line_total(&lines)?;
        Ok(Self {
            cart_id,
            session_token,
            version,
            lines,
            total_count,
            updated_at: Utc::now(),
        })
    }

    /// Successor snapshot of the same cart with the given lines.
    pub fn successor(&self, lines: BTreeMap<ProductId, u32>) -> Result<Self> {
        Self::from_lines(
            self.cart_id,
            self.session_token.clone(),
            self.version + 1,
            lines,
        )
    }

    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }

    pub fn session_token(&self) -> &SessionToken {
        &self.session_token
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn lines(&self) -> &BTreeMap<ProductId, u32> {
        &self.lines
    }

    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.lines.get(product_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lines.contains_key(product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn line_total(lines: &BTreeMap<ProductId, u32>) -> Result<u32> {
    lines.values().try_fold(0u32, |total, &qty| {
        total
            .checked_add(qty)
            .ok_or(CommerceError::InvalidQuantity(qty))
    })
}

/// Wire form of [`CartSnapshot`]. Any `total_count` field is ignored and
/// recomputed from `lines`.
#[derive(Deserialize)]
struct CartSnapshotRepr {
    cart_id: CartId,
    session_token: SessionToken,
    version: u64,
    lines: BTreeMap<ProductId, u32>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartSnapshotRepr> for CartSnapshot {
    type Error = CommerceError;

    fn try_from(repr: CartSnapshotRepr) -> Result<Self> {
        let mut snapshot =
            Self::from_lines(repr.cart_id, repr.session_token, repr.version, repr.lines)?;
        snapshot.updated_at = repr.updated_at;
        Ok(snapshot)
    }
}
