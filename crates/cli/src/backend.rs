//! Cart backends.
//!
//! [`LocalCart`] keeps the cart in a local slot and only talks to the server
//! at checkout. [`RemoteCart`] keeps the cart on the server and re-renders
//! from the cart each response carries. Both address lines by display name.

use async_trait::async_trait;
use cafe_aroma_core::{Cart, Resolved, StoredCartLine};
use cafe_aroma_storefront::render::CartView;

use crate::error::ClientError;
use crate::persistence::CartPersistence;
use crate::remote::RemoteClient;

/// The cart operations behind the shop commands.
#[async_trait]
pub trait CartBackend: Send {
    /// Current cart.
    async fn load(&mut self) -> Result<CartView, ClientError>;

    /// Add `quantity` units of a resolved product.
    async fn add(&mut self, item: &Resolved, quantity: u32) -> Result<CartView, ClientError>;

    /// One more unit of a line.
    async fn increment(&mut self, name: &str) -> Result<CartView, ClientError>;

    /// One less unit of a line; the line goes away at zero.
    async fn decrement(&mut self, name: &str) -> Result<CartView, ClientError>;

    /// Delete a line.
    async fn remove(&mut self, name: &str) -> Result<CartView, ClientError>;

    /// Delete every line.
    async fn clear(&mut self) -> Result<CartView, ClientError>;

    /// Place the cart as an order. Returns the server message; the cart is
    /// empty afterwards.
    async fn checkout(&mut self) -> Result<String, ClientError>;
}

/// Cart held in a local slot.
pub struct LocalCart<P> {
    cart: Cart,
    persistence: P,
    client: RemoteClient,
}

impl<P: CartPersistence> LocalCart<P> {
    /// Load the cart from `persistence`. `client` is only used at checkout.
    pub fn open(persistence: P, client: RemoteClient) -> Self {
        Self {
            cart: persistence.load(),
            persistence,
            client,
        }
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Save after a mutation. The mutation stays applied if saving fails.
    fn persist(&self) -> CartView {
        if let Err(e) = self.persistence.save(&self.cart) {
            tracing::warn!(error = %e, "Could not save cart; changes kept for this run only");
        }
        CartView::from(&self.cart)
    }
}

#[async_trait]
impl<P: CartPersistence> CartBackend for LocalCart<P> {
    async fn load(&mut self) -> Result<CartView, ClientError> {
        Ok(CartView::from(&self.cart))
    }

    async fn add(&mut self, item: &Resolved, quantity: u32) -> Result<CartView, ClientError> {
        self.cart.add(&item.name, item.unit_price, quantity)?;
        tracing::debug!(nombre = %item.name, quantity, "Added to local cart");
        Ok(self.persist())
    }

    async fn increment(&mut self, name: &str) -> Result<CartView, ClientError> {
        self.cart.increment(name)?;
        Ok(self.persist())
    }

    async fn decrement(&mut self, name: &str) -> Result<CartView, ClientError> {
        self.cart.decrement(name)?;
        Ok(self.persist())
    }

    async fn remove(&mut self, name: &str) -> Result<CartView, ClientError> {
        self.cart.remove(name)?;
        Ok(self.persist())
    }

    async fn clear(&mut self) -> Result<CartView, ClientError> {
        self.cart.clear();
        Ok(self.persist())
    }

    async fn checkout(&mut self) -> Result<String, ClientError> {
        if self.cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let message = self.client.submit_order(self.cart.lines()).await?;
        self.cart.clear();
        self.persist();
        Ok(message)
    }
}

/// Cart held by the storefront, keyed by the client's session.
pub struct RemoteCart {
    client: RemoteClient,
    lines: Vec<StoredCartLine>,
}

impl RemoteCart {
    /// Create a backend over `client`. Nothing is fetched until the first call.
    #[must_use]
    pub const fn new(client: RemoteClient) -> Self {
        Self {
            client,
            lines: Vec::new(),
        }
    }

    fn accept(&mut self, lines: Vec<StoredCartLine>) -> CartView {
        self.lines = lines;
        CartView::from(self.lines.as_slice())
    }

    /// Find a line by name, refreshing from the server when it is not known.
    async fn line(&mut self, name: &str) -> Result<StoredCartLine, ClientError> {
        if let Some(line) = self.lines.iter().find(|line| line.name == name) {
            return Ok(line.clone());
        }

        self.lines = self.client.read().await?;
        self.lines
            .iter()
            .find(|line| line.name == name)
            .cloned()
            .ok_or_else(|| ClientError::NotInCart(name.to_owned()))
    }
}

#[async_trait]
impl CartBackend for RemoteCart {
    async fn load(&mut self) -> Result<CartView, ClientError> {
        let lines = self.client.read().await?;
        Ok(self.accept(lines))
    }

    async fn add(&mut self, item: &Resolved, quantity: u32) -> Result<CartView, ClientError> {
        let lines = self
            .client
            .add(&item.name, item.unit_price, quantity)
            .await?;
        Ok(self.accept(lines))
    }

    async fn increment(&mut self, name: &str) -> Result<CartView, ClientError> {
        let line = self.line(name).await?;
        let lines = self.client.add(&line.name, line.unit_price, 1).await?;
        Ok(self.accept(lines))
    }

    async fn decrement(&mut self, name: &str) -> Result<CartView, ClientError> {
        let line = self.line(name).await?;
        let lines = self
            .client
            .update(line.id, line.quantity.saturating_sub(1))
            .await?;
        Ok(self.accept(lines))
    }

    async fn remove(&mut self, name: &str) -> Result<CartView, ClientError> {
        let line = self.line(name).await?;
        let lines = self.client.delete(line.id).await?;
        Ok(self.accept(lines))
    }

    async fn clear(&mut self) -> Result<CartView, ClientError> {
        let lines = self.client.clear().await?;
        Ok(self.accept(lines))
    }

    async fn checkout(&mut self) -> Result<String, ClientError> {
        let lines = self.client.read().await?;
        if lines.is_empty() {
            self.lines = lines;
            return Err(ClientError::EmptyCart);
        }

        let order: Vec<_> = lines.iter().map(StoredCartLine::to_cart_line).collect();
        let message = self.client.submit_order(&order).await?;
        self.lines.clear();
        Ok(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_aroma_core::{CartError, Catalog, Selection, UnitPrice};

    use super::*;
    use crate::persistence::{FileSlot, MemorySlot};

    /// A client pointing at a port nothing listens on.
    fn offline_client() -> RemoteClient {
        RemoteClient::new("http://127.0.0.1:9").unwrap()
    }

    fn espresso_grande() -> Resolved {
        Catalog::cafe_menu()
            .resolve(
                "espresso",
                &Selection {
                    radio: Some("Grande".to_owned()),
                    dropdown: None,
                },
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_twice_merges() {
        let mut backend = LocalCart::open(MemorySlot::default(), offline_client());

        backend.add(&espresso_grande(), 1).await.unwrap();
        let view = backend.add(&espresso_grande(), 1).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Espresso (Grande)");
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.total, "5.00");
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes() {
        let mut backend = LocalCart::open(MemorySlot::default(), offline_client());
        backend.add(&espresso_grande(), 1).await.unwrap();

        let view = backend.increment("Espresso (Grande)").await.unwrap();
        assert_eq!(view.items[0].quantity, 2);

        backend.decrement("Espresso (Grande)").await.unwrap();
        let view = backend.decrement("Espresso (Grande)").await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total, "0.00");
    }

    #[tokio::test]
    async fn test_unknown_line_is_reported() {
        let mut backend = LocalCart::open(MemorySlot::default(), offline_client());

        assert!(matches!(
            backend.increment("Capuchino (Grande)").await,
            Err(ClientError::Cart(CartError::NotFound(_)))
        ));
        assert!(matches!(
            backend.remove("Capuchino (Grande)").await,
            Err(ClientError::Cart(CartError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_mutations_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path(), "carrito").unwrap();

        let mut backend = LocalCart::open(slot.clone(), offline_client());
        backend.add(&espresso_grande(), 3).await.unwrap();

        let reopened = LocalCart::open(slot.clone(), offline_client());
        assert_eq!(reopened.cart().item_count(), 3);

        let mut backend = reopened;
        backend.clear().await.unwrap();
        assert!(slot.load().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_mutation() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the slot directory should be
        let blocker = dir.path().join("bloqueado");
        std::fs::write(&blocker, "").unwrap();
        let slot = FileSlot::new(&blocker, "carrito").unwrap();

        let mut backend = LocalCart::open(slot, offline_client());
        let view = backend.add(&espresso_grande(), 1).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(backend.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart() {
        let mut backend = LocalCart::open(MemorySlot::default(), offline_client());
        assert!(matches!(
            backend.checkout().await,
            Err(ClientError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() {
        let slot = MemorySlot::default();
        let mut cart = Cart::new();
        cart.add("Tarta de Chocolate", UnitPrice::parse("4.50").unwrap(), 1)
            .unwrap();
        slot.save(&cart).unwrap();

        let mut backend = LocalCart::open(slot, offline_client());
        assert!(matches!(
            backend.checkout().await,
            Err(ClientError::Http(_))
        ));
        assert_eq!(backend.cart(), &cart);
    }
}
