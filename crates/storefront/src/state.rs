//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::CartRepository;
use crate::services::Notifier;

/// How often idle carts are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: Arc<dyn CartRepository>,
    notifier: Arc<dyn Notifier>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `carts` - Cart storage
    /// * `notifier` - Destination for order and contact notifications
    /// * `pool` - `PostgreSQL` pool backing the repository, checked by `/health/ready`
    pub fn new(
        config: StorefrontConfig,
        carts: Arc<dyn CartRepository>,
        notifier: Arc<dyn Notifier>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts,
                notifier,
                pool,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Cart storage.
    #[must_use]
    pub fn carts(&self) -> &dyn CartRepository {
        self.inner.carts.as_ref()
    }

    /// Notification transport.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// Get a reference to the database connection pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Start the background task that drops idle carts.
    pub fn start_cart_purge(&self) {
        let carts = Arc::clone(&self.inner.carts);
        let idle = self.inner.config.cart_idle_ttl;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                match carts.purge_idle(idle).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Purged idle cart lines"),
                    Err(e) => tracing::warn!(error = %e, "Failed to purge idle carts"),
                }
            }
        });
    }
}
