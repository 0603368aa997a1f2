//! Server-side cart driven through the client backend.

#![allow(clippy::unwrap_used)]

use cafe_aroma_cli::{CartBackend, ClientError, RemoteCart, RemoteClient};
use cafe_aroma_core::{Catalog, Resolved, Selection};
use cafe_aroma_integration_tests::TestServer;

fn resolve(slug: &str, radio: Option<&str>, dropdown: Option<&str>) -> Resolved {
    Catalog::cafe_menu()
        .resolve(
            slug,
            &Selection {
                radio: radio.map(str::to_owned),
                dropdown: dropdown.map(str::to_owned),
            },
        )
        .unwrap()
}

#[tokio::test]
async fn test_fresh_session_shows_empty_cart() {
    let server = TestServer::start().await;
    let mut cart = RemoteCart::new(server.client());

    let view = cart.load().await.unwrap();

    assert!(view.items.is_empty());
    assert_eq!(view.total, "0.00");
}

#[tokio::test]
async fn test_add_twice_merges_on_server() {
    let server = TestServer::start().await;
    let mut cart = RemoteCart::new(server.client());
    let espresso = resolve("espresso", Some("Grande"), None);

    cart.add(&espresso, 1).await.unwrap();
    let view = cart.add(&espresso, 1).await.unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 2);
    assert_eq!(view.total, "5.00");

    // The same session sees the same cart
    let reread = cart.load().await.unwrap();
    assert_eq!(reread, view);
}

#[tokio::test]
async fn test_increment_decrement_remove() {
    let server = TestServer::start().await;
    let mut cart = RemoteCart::new(server.client());

    cart.add(&resolve("te", None, Some("Rooibos")), 1).await.unwrap();
    cart.add(&resolve("tarta-de-chocolate", None, None), 1)
        .await
        .unwrap();

    let view = cart.increment("Té e Infusiones (Rooibos)").await.unwrap();
    assert_eq!(view.items[0].quantity, 2);
    assert_eq!(view.total, "8.90");

    cart.decrement("Té e Infusiones (Rooibos)").await.unwrap();
    let view = cart.decrement("Té e Infusiones (Rooibos)").await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].name, "Tarta de Chocolate");

    let view = cart.remove("Tarta de Chocolate").await.unwrap();
    assert!(view.items.is_empty());

    assert!(matches!(
        cart.increment("Tarta de Chocolate").await,
        Err(ClientError::NotInCart(_))
    ));
}

#[tokio::test]
async fn test_sessions_are_isolated_and_clear() {
    let server = TestServer::start().await;
    let mut alice = RemoteCart::new(server.client());
    let mut bruno = RemoteCart::new(server.client());

    alice
        .add(&resolve("cafe-de-origen", Some("Molido"), Some("Etiopía")), 1)
        .await
        .unwrap();

    assert!(bruno.load().await.unwrap().items.is_empty());

    let view = alice.clear().await.unwrap();
    assert!(view.items.is_empty());
    assert!(alice.load().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_session_survives_between_runs() {
    let server = TestServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session");

    let first = RemoteClient::with_session_file(&server.url(), &session).unwrap();
    let mut cart = RemoteCart::new(first);
    cart.add(&resolve("capuchino", None, None), 2).await.unwrap();
    assert!(session.exists());

    let second = RemoteClient::with_session_file(&server.url(), &session).unwrap();
    let view = RemoteCart::new(second).load().await.unwrap();
    assert_eq!(view.items[0].name, "Capuchino (Pequeño)");
    assert_eq!(view.items[0].quantity, 2);
}

#[tokio::test]
async fn test_rejected_update_reports_server_message() {
    let server = TestServer::start().await;
    let client = server.client();

    let error = client
        .update(cafe_aroma_core::CartLineId::new(99), 1)
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Rejected { status: 404, .. }));
}
