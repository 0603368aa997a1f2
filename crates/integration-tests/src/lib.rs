//! Integration tests for Café Aroma.
//!
//! Each test binds the storefront router to an ephemeral port, with
//! in-memory carts and sessions, and drives it over HTTP with the shop
//! client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cafe-aroma-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `remote_cart` - Server-side cart through the client backend
//! - `checkout` - Orders from local and server carts
//! - `contact` - Contact form submission and rate limiting

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cafe_aroma_cli::RemoteClient;
use cafe_aroma_core::Email;
use cafe_aroma_storefront::config::{ShopConfig, StorefrontConfig};
use cafe_aroma_storefront::db::MemoryCartRepository;
use cafe_aroma_storefront::services::{Notification, Notifier, NotifyError};
use cafe_aroma_storefront::state::AppState;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

/// Shop inbox used by every test server.
pub const INBOX: &str = "pedidos@cafearoma.es";

/// Notifier that keeps what it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose deliveries always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn config(addr: SocketAddr) -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        shop: ShopConfig {
            name: "Café Aroma".to_string(),
            inbox: Email::parse(INBOX).unwrap(),
        },
        cart_idle_ttl: Duration::from_secs(600),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A storefront running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestServer {
    /// Start a server whose notifications are recorded.
    pub async fn start() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    /// Start a server with the given notifier.
    pub async fn with_notifier(notifier: RecordingNotifier) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notifier = Arc::new(notifier);

        let carts = Arc::new(MemoryCartRepository::new(Duration::from_secs(600)));
        let state = AppState::new(config(addr), carts, notifier.clone(), None);
        let app = cafe_aroma_storefront::app(state, MemoryStore::default());

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self { addr, notifier }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client with a fresh session.
    #[must_use]
    pub fn client(&self) -> RemoteClient {
        RemoteClient::new(&self.url()).unwrap()
    }
}
