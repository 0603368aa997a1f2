//! Business logic services for the storefront.
//!
//! - `notifier` - Order and contact notifications for the shop inbox

pub mod notifier;

pub use notifier::{
    LogNotifier, Notification, Notifier, NotifyError, contact_notification, order_notification,
};
