//! Cart storage for the storefront.
//!
//! # Backends
//!
//! - [`PgCartRepository`] - `PostgreSQL` (`storefront.cart_line`), used when a
//!   database URL is configured
//! - [`MemoryCartRepository`] - in-process `moka` cache with idle expiry, used
//!   otherwise and in tests
//!
//! Both keep lines in first-add order and merge additions by line name.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cafe-aroma-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use cafe_aroma_core::{CartError, CartKey, CartLineId, StoredCartLine, UnitPrice};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryCartRepository;
pub use postgres::PgCartRepository;

/// Errors raised by cart repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced cart line does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request would break a cart invariant.
    #[error("Invalid cart operation: {0}")]
    Cart(#[from] CartError),

    /// Stored data could not be turned back into domain types.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// Storage for server-side carts, keyed by the session's [`CartKey`].
///
/// Every mutation returns the authoritative lines after the change.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Lines of a cart in first-add order. Unknown carts are empty.
    async fn lines(&self, cart: CartKey) -> Result<Vec<StoredCartLine>, RepositoryError>;

    /// Add units of a product, merging into an existing line with the same name.
    async fn add(
        &self,
        cart: CartKey,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError>;

    /// Set the quantity of a line. Zero deletes it.
    async fn set_quantity(
        &self,
        cart: CartKey,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError>;

    /// Delete a line. Deleting an absent line is not an error.
    async fn remove(
        &self,
        cart: CartKey,
        id: CartLineId,
    ) -> Result<Vec<StoredCartLine>, RepositoryError>;

    /// Delete every line of a cart.
    async fn clear(&self, cart: CartKey) -> Result<(), RepositoryError>;

    /// Drop carts untouched for longer than `idle`. Returns the number of
    /// lines removed, when the backend can tell.
    async fn purge_idle(&self, idle: Duration) -> Result<u64, RepositoryError>;
}

/// Largest quantity a single cart line may hold in any backend. Matches the
/// `INTEGER` column of `storefront.cart_line`.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Check the arguments of an add before touching storage.
pub(crate) fn check_add(name: &str, quantity: u32) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(CartError::EmptyName.into());
    }
    if quantity == 0 {
        return Err(CartError::ZeroQuantity.into());
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CartError::QuantityOverflow(name.to_owned()).into());
    }
    Ok(())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
