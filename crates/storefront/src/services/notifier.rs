//! Shop notifications for placed orders and contact messages.
//!
//! Notifications are rendered from plain text Askama templates and handed to
//! a [`Notifier`]. The bundled [`LogNotifier`] records them as structured
//! `tracing` events; a mail transport can implement the same trait.

use askama::Template;
use async_trait::async_trait;
use cafe_aroma_core::{Cart, ContactMessage, Email, format_amount};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ShopConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Plain text body for an order notification.
#[derive(Template)]
#[template(path = "email/order.txt")]
struct OrderEmailText<'a> {
    shop_name: &'a str,
    received_at: String,
    lines: Vec<OrderLineText<'a>>,
    item_count: u64,
    total: String,
}

struct OrderLineText<'a> {
    name: &'a str,
    quantity: u32,
    unit_price: String,
    subtotal: String,
}

/// Plain text body for a contact notification.
#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    shop_name: &'a str,
    received_at: String,
    name: &'a str,
    email: &'a str,
    body: &'a str,
}

/// Errors that can occur when notifying the shop.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The transport refused or lost the notification.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// A rendered notification addressed to the shop inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient (the shop inbox).
    pub to: Email,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Address replies should go to, when a customer wrote in.
    pub reply_to: Option<Email>,
}

/// Delivers notifications to the shop.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that records each notification as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.to,
            reply_to = notification.reply_to.as_ref().map(Email::as_str),
            subject = %notification.subject,
            body = %notification.body,
            "Shop notification"
        );
        Ok(())
    }
}

/// Render the notification for a placed order.
///
/// # Errors
///
/// Returns `NotifyError::Template` if the body fails to render.
pub fn order_notification(
    shop: &ShopConfig,
    cart: &Cart,
    received_at: DateTime<Utc>,
) -> Result<Notification, NotifyError> {
    let total = cart.total_display();
    let lines = cart
        .lines()
        .iter()
        .map(|line| OrderLineText {
            name: &line.name,
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            subtotal: format_amount(line.subtotal()),
        })
        .collect();

    let body = OrderEmailText {
        shop_name: &shop.name,
        received_at: received_at.format(TIMESTAMP_FORMAT).to_string(),
        lines,
        item_count: cart.item_count(),
        total: total.clone(),
    }
    .render()?;

    Ok(Notification {
        to: shop.inbox.clone(),
        subject: format!("Nuevo pedido ({total} €) - {}", shop.name),
        body,
        reply_to: None,
    })
}

/// Render the notification for a contact message.
///
/// # Errors
///
/// Returns `NotifyError::Template` if the body fails to render.
pub fn contact_notification(
    shop: &ShopConfig,
    message: &ContactMessage,
    received_at: DateTime<Utc>,
) -> Result<Notification, NotifyError> {
    let body = ContactEmailText {
        shop_name: &shop.name,
        received_at: received_at.format(TIMESTAMP_FORMAT).to_string(),
        name: &message.name,
        email: message.email.as_str(),
        body: &message.body,
    }
    .render()?;

    Ok(Notification {
        to: shop.inbox.clone(),
        subject: format!("Mensaje de contacto de {} - {}", message.name, shop.name),
        body,
        reply_to: Some(message.email.clone()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_aroma_core::{ContactForm, UnitPrice};
    use chrono::TimeZone;

    use super::*;

    fn shop() -> ShopConfig {
        ShopConfig {
            name: "Café Aroma".to_owned(),
            inbox: Email::parse("pedidos@cafearoma.es").unwrap(),
        }
    }

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_order_notification_lists_lines_and_total() {
        let mut cart = Cart::new();
        cart.add("Espresso (Grande)", UnitPrice::parse("2.50").unwrap(), 2)
            .unwrap();
        cart.add("Tarta de Chocolate", UnitPrice::parse("4.50").unwrap(), 1)
            .unwrap();

        let notification = order_notification(&shop(), &cart, received_at()).unwrap();

        assert_eq!(notification.to.as_str(), "pedidos@cafearoma.es");
        assert_eq!(notification.subject, "Nuevo pedido (9.50 €) - Café Aroma");
        assert!(notification.body.contains("2026-10-19 09:30 UTC"));
        assert!(
            notification
                .body
                .contains("- Espresso (Grande) x 2 (2.50 €/ud.): 5.00 €")
        );
        assert!(notification.body.contains("- Tarta de Chocolate x 1 (4.50 €/ud.): 4.50 €"));
        assert!(notification.body.contains("Artículos: 3"));
        assert!(notification.body.contains("Total: 9.50 €"));
        assert!(notification.reply_to.is_none());
    }

    #[test]
    fn test_contact_notification_replies_to_sender() {
        let message = ContactForm {
            name: "Ana".to_owned(),
            email: "ana@example.com".to_owned(),
            message: "¿Tenéis leche de avena?".to_owned(),
        }
        .validate()
        .unwrap();

        let notification = contact_notification(&shop(), &message, received_at()).unwrap();

        assert_eq!(notification.subject, "Mensaje de contacto de Ana - Café Aroma");
        assert_eq!(notification.reply_to.unwrap().as_str(), "ana@example.com");
        assert!(notification.body.contains("Nombre: Ana"));
        assert!(notification.body.contains("¿Tenéis leche de avena?"));
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_notifications() {
        let notification = Notification {
            to: shop().inbox,
            subject: "Prueba".to_owned(),
            body: "Hola".to_owned(),
            reply_to: None,
        };
        assert!(LogNotifier.notify(&notification).await.is_ok());
    }
}
