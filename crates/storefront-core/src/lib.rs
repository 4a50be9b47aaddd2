//! storefront-core: session-bound shopping cart and widget query composition.
//!
//! Two independent protocols live here:
//!
//! - **Cart**: [`CartOperationHandler`] performs one add/remove against the
//!   cart snapshot bound to a [`BrowsingSession`], delegating line-item
//!   bookkeeping to a [`CartBackend`]. Without a backend every operation
//!   reports [`CartOutcome::Disabled`].
//! - **Listing query**: widgets implementing [`QueryContributor`] are folded,
//!   in page order, into one [`QueryBuilder`] by the
//!   [`QueryContributionPipeline`], which is then handed to a
//!   [`CatalogQueryExecutor`].
//!
//! No HTTP types; see `storefront-server` for the routes.

pub mod cart;
pub mod catalog;
pub mod contributor;
pub mod error;
pub mod memory;
pub mod ports;
pub mod query;
pub mod session;
pub mod types;
pub mod widgets;

pub use cart::{CartOperationHandler, CartOutcome};
pub use catalog::{render_listing, InMemoryCatalog, Product, QueryResult};
pub use contributor::{QueryContributionPipeline, QueryContributor, WidgetModel};
pub use error::{CommerceError, Result};
pub use memory::InMemoryCartBackend;
pub use ports::{CartBackend, CatalogQueryExecutor};
pub use query::{QueryBuilder, QueryFlag};
pub use session::{BrowsingSession, CartSessionStore, SessionRegistry, CART_SESSION_KEY};
pub use types::{CartId, CartSnapshot, ProductId, SessionToken};
