//! Contact form route handler.
//!
//! Messages are validated and forwarded to the shop inbox. They are never
//! stored.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};
use cafe_aroma_core::{ApiResponse, ContactForm};
use chrono::Utc;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::contact_notification;
use crate::state::AppState;

pub(crate) const CONTACT_SENT_MESSAGE: &str = "¡Mensaje enviado con éxito! Gracias por contactar.";
pub(crate) const CONTACT_INVALID_MESSAGE: &str =
    "Por favor, rellena todos los campos con un email válido.";
pub(crate) const CONTACT_FAILED_MESSAGE: &str = "Error: El mensaje no se pudo enviar.";

/// Submit a contact message.
///
/// POST /api/contacto
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    form: std::result::Result<Form<ContactForm>, FormRejection>,
) -> Result<Json<ApiResponse>> {
    let Form(form) =
        form.map_err(|_| AppError::BadRequest(CONTACT_INVALID_MESSAGE.to_string()))?;

    let message = form.validate().map_err(|e| {
        tracing::debug!(error = %e, "Rejected contact form");
        AppError::Validation(CONTACT_INVALID_MESSAGE.to_string())
    })?;

    let notification = contact_notification(&state.config().shop, &message, Utc::now())
        .map_err(|e| AppError::notify(CONTACT_FAILED_MESSAGE, e))?;
    state
        .notifier()
        .notify(&notification)
        .await
        .map_err(|e| AppError::notify(CONTACT_FAILED_MESSAGE, e))?;

    add_breadcrumb("contact", "Contact message sent", None);
    tracing::info!(email_domain = message.email.domain(), "Contact message sent");

    Ok(Json(ApiResponse::ok(CONTACT_SENT_MESSAGE)))
}
