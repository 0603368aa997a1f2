//! In-memory cart repository.
//!
//! Carts live in a `moka` cache and expire after a period without access.
//! Each cart sits behind its own mutex so concurrent requests for the same
//! cart apply one after the other.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cafe_aroma_core::{CartError, CartKey, CartLineId, StoredCartLine, UnitPrice};
use moka::future::Cache;
use tokio::sync::Mutex;

use super::{CartRepository, MAX_LINE_QUANTITY, RepositoryError, check_add};

/// Upper bound on carts held at once.
const MAX_CARTS: u64 = 10_000;

#[derive(Debug, Default)]
struct StoredCart {
    last_id: i32,
    lines: Vec<StoredCartLine>,
}

impl StoredCart {
    fn add(
        &mut self,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        if let Some(line) = self.lines.iter_mut().find(|line| line.name == name) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .filter(|merged| *merged <= MAX_LINE_QUANTITY)
                .ok_or_else(|| CartError::QuantityOverflow(name.to_owned()))?;
            return Ok(());
        }

        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::DataCorruption("cart line ids exhausted".into()))?;
        self.lines.push(StoredCartLine {
            id: CartLineId::new(self.last_id),
            name: name.to_owned(),
            unit_price,
            quantity,
        });
        Ok(())
    }

    fn set_quantity(&mut self, id: CartLineId, quantity: u32) -> Result<(), RepositoryError> {
        let index = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("cart line {id}")))?;

        if quantity == 0 {
            self.lines.remove(index);
        } else if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityOverflow(id.to_string()).into());
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
        }
        Ok(())
    }
}

/// Cart repository backed by an in-process cache.
#[derive(Clone)]
pub struct MemoryCartRepository {
    carts: Cache<CartKey, Arc<Mutex<StoredCart>>>,
}

impl MemoryCartRepository {
    /// Create a repository whose carts expire after `idle_ttl` without access.
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_CARTS)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }

    async fn cart(&self, key: CartKey) -> Arc<Mutex<StoredCart>> {
        self.carts
            .get_with(key, async { Arc::new(Mutex::new(StoredCart::default())) })
            .await
    }
}

#[async_trait]
impl CartRepository for MemoryCartRepository {
    async fn lines(&self, cart: CartKey) -> Result<Vec<StoredCartLine>, RepositoryError> {
        match self.carts.get(&cart).await {
            Some(stored) => Ok(stored.lock().await.lines.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn add(
        &self,
        cart: CartKey,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        check_add(name, quantity)?;

        let stored = self.cart(cart).await;
        let mut stored = stored.lock().await;
        stored.add(name, unit_price, quantity)?;
        Ok(stored.lines.clone())
    }

    async fn set_quantity(
        &self,
        cart: CartKey,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let Some(stored) = self.carts.get(&cart).await else {
            return Err(RepositoryError::NotFound(format!("cart line {id}")));
        };
        let mut stored = stored.lock().await;
        stored.set_quantity(id, quantity)?;
        Ok(stored.lines.clone())
    }

    async fn remove(
        &self,
        cart: CartKey,
        id: CartLineId,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let Some(stored) = self.carts.get(&cart).await else {
            return Ok(Vec::new());
        };
        let mut stored = stored.lock().await;
        stored.lines.retain(|line| line.id != id);
        Ok(stored.lines.clone())
    }

    async fn clear(&self, cart: CartKey) -> Result<(), RepositoryError> {
        if let Some(stored) = self.carts.get(&cart).await {
            stored.lock().await.lines.clear();
        }
        Ok(())
    }

    async fn purge_idle(&self, _idle: Duration) -> Result<u64, RepositoryError> {
        // Expiry is handled by the cache itself; this only flushes its housekeeping.
        self.carts.run_pending_tasks().await;
        Ok(0)
    }
}
