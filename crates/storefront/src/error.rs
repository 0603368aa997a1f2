//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors answer with the same
//! JSON envelope as successful requests (`success: false`), a status code
//! matching the failure, and a message safe to show to the shopper. Server
//! side failures are captured to Sentry first.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cafe_aroma_core::{ApiResponse, CartError};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::NotifyError;

const INTERNAL_MESSAGE: &str = "Error interno del servidor. Inténtalo de nuevo más tarde.";
const LINE_NOT_FOUND_MESSAGE: &str = "Producto no encontrado en el carrito.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart storage failed or refused the change.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The shop could not be notified.
    #[error("Notification error: {source}")]
    Notify {
        /// Message shown to the shopper.
        message: &'static str,
        #[source]
        source: NotifyError,
    },

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Well-formed request with invalid content. The message is shown as is.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Malformed request. The message is shown as is.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,
}

impl AppError {
    /// Notification failure with the message to show.
    #[must_use]
    pub const fn notify(message: &'static str, source: NotifyError) -> Self {
        Self::Notify { message, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(RepositoryError::NotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Repository(RepositoryError::Cart(_)) | Self::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Notify {
                source: NotifyError::Delivery(_),
                ..
            } => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Repository(_) | Self::Notify { .. } | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Repository(RepositoryError::NotFound(_)) => LINE_NOT_FOUND_MESSAGE.to_string(),
            Self::Repository(RepositoryError::Cart(err)) => cart_error_message(err).to_string(),
            Self::Notify {
                message,
                source: NotifyError::Delivery(_),
            } => (*message).to_string(),
            Self::Validation(msg) | Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::RateLimited => {
                "Demasiadas solicitudes. Inténtalo de nuevo en unos minutos.".to_string()
            }
            Self::Repository(_) | Self::Notify { .. } | Self::Session(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }
}

/// Shopper-facing text for a rejected cart change.
#[must_use]
pub const fn cart_error_message(err: &CartError) -> &'static str {
    match err {
        CartError::EmptyName => "El nombre del producto es obligatorio.",
        CartError::ZeroQuantity => "La cantidad debe ser al menos 1.",
        CartError::QuantityOverflow(_) => "La cantidad solicitada es demasiado grande.",
        CartError::DuplicateLine(_) => "El pedido contiene productos repetidos.",
        CartError::NotFound(_) => LINE_NOT_FOUND_MESSAGE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(ApiResponse::failure(self.public_message()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("nombre", "Espresso (Grande)")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
