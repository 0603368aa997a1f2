//! Order submission.
//!
//! The shopper's full cart arrives as a JSON array of
//! `{nombre, precio, cantidad}` lines. A valid order is turned into a shop
//! notification; nothing is charged or stored.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use cafe_aroma_core::{ApiResponse, Cart, CartLine};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb, cart_error_message};
use crate::models::current_cart_key;
use crate::services::order_notification;
use crate::state::AppState;

pub(crate) const ORDER_PLACED_MESSAGE: &str = "¡Pedido procesado con éxito! Revisa tu correo.";
pub(crate) const EMPTY_ORDER_MESSAGE: &str = "Tu carrito está vacío.";
const ORDER_FAILED_MESSAGE: &str = "Error: El pedido no se pudo procesar.";

/// Submit an order.
///
/// POST /api/pedido
///
/// On success the session's server-side cart, if any, is emptied. Failing to
/// empty it is logged and does not fail the order.
#[instrument(skip(state, session, body))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<Vec<CartLine>>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(lines) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected order body");
        AppError::BadRequest("Formato de pedido no válido.".to_string())
    })?;

    if lines.is_empty() {
        return Err(AppError::Validation(EMPTY_ORDER_MESSAGE.to_string()));
    }
    let cart = Cart::try_from(lines)
        .map_err(|e| AppError::Validation(cart_error_message(&e).to_string()))?;

    let notification = order_notification(&state.config().shop, &cart, Utc::now())
        .map_err(|e| AppError::notify(ORDER_FAILED_MESSAGE, e))?;
    state
        .notifier()
        .notify(&notification)
        .await
        .map_err(|e| AppError::notify(ORDER_FAILED_MESSAGE, e))?;

    let total = cart.total_display();
    add_breadcrumb("order", "Order placed", Some(&[("total", total.as_str())]));
    tracing::info!(
        lines = cart.len(),
        items = cart.item_count(),
        total = %total,
        "Order placed"
    );

    // The order is already dispatched from here on; clearing is best-effort.
    match current_cart_key(&session).await {
        Ok(Some(key)) => {
            if let Err(e) = state.carts().clear(key).await {
                tracing::warn!(error = %e, "Failed to clear cart after order");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read cart key after order"),
    }

    Ok(Json(ApiResponse::ok(ORDER_PLACED_MESSAGE)))
}
