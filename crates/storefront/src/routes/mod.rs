//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database, when configured)
//!
//! # Cart pages
//! GET  /carrito                - Cart page
//! GET  /carrito/items          - Cart items fragment
//!
//! # JSON API (form or JSON in, envelope out)
//! GET  /api/carrito?accion=leer - Read the cart
//! POST /api/carrito            - agregar | actualizar | eliminar | vaciar | leer
//! POST /api/pedido             - Submit an order
//! POST /api/contacto           - Send a contact message
//! ```

pub mod cart;
pub mod contact;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, contact_rate_limiter, rate_limited_envelope};
use crate::state::AppState;

/// Create the cart page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/carrito", get(cart::show))
        .route("/carrito/items", get(cart::items))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    let contact = Router::new()
        .route("/contacto", post(contact::submit))
        .layer(contact_rate_limiter());

    Router::new()
        .route("/carrito", get(cart::read).post(cart::mutate))
        .route("/pedido", post(orders::submit))
        .layer(api_rate_limiter())
        .merge(contact)
        .layer(axum::middleware::map_response(rate_limited_envelope))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .nest("/api", api_routes())
}
