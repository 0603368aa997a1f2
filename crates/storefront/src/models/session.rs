//! Session-related types.
//!
//! The session only carries the key of the shopper's server-side cart. The
//! cart itself lives in the [`CartRepository`](crate::db::CartRepository).

use cafe_aroma_core::CartKey;
use tower_sessions::Session;

/// Session key for the shopper's cart key.
pub const CART_KEY: &str = "cart_key";

/// Read the cart key from the session, if one was assigned.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn current_cart_key(
    session: &Session,
) -> Result<Option<CartKey>, tower_sessions::session::Error> {
    session.get::<CartKey>(CART_KEY).await
}

/// Read the cart key from the session, assigning a fresh one on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn ensure_cart_key(session: &Session) -> Result<CartKey, tower_sessions::session::Error> {
    if let Some(key) = current_cart_key(session).await? {
        return Ok(key);
    }

    let key = CartKey::generate();
    session.insert(CART_KEY, key).await?;
    tracing::debug!(cart_key = %key, "Assigned cart to session");
    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_fresh_session_has_no_cart() {
        assert_eq!(current_cart_key(&session()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cart_key_is_stable_within_session() {
        let session = session();
        let first = ensure_cart_key(&session).await.unwrap();
        let second = ensure_cart_key(&session).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(current_cart_key(&session).await.unwrap(), Some(first));
    }
}
