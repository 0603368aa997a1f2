//! Wire types shared by the cart endpoint and its clients.
//!
//! Field names follow the endpoint's form and JSON contract (`accion`,
//! `nombre`, `precio`, `cantidad`, `mensaje`, `carrito`). Every endpoint
//! answers with the same [`ApiResponse`] envelope.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartError, CartLine};
use crate::types::{CartLineId, Email, EmailError, UnitPrice};

/// The JSON envelope returned by every API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the request was carried out.
    pub success: bool,
    /// Message meant for the shopper.
    pub message: String,
    /// The authoritative cart after the request, for cart actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrito: Option<Vec<StoredCartLine>>,
}

impl ApiResponse {
    /// A successful response without cart contents.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            carrito: None,
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            carrito: None,
        }
    }

    /// Attach the current cart contents.
    #[must_use]
    pub fn with_cart(mut self, lines: Vec<StoredCartLine>) -> Self {
        self.carrito = Some(lines);
        self
    }
}

/// The cart actions understood by the cart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    /// Add units of a product.
    Agregar,
    /// Read the cart.
    Leer,
    /// Set the quantity of a line; zero deletes it.
    Actualizar,
    /// Delete a line.
    Eliminar,
    /// Delete every line.
    Vaciar,
}

impl CartAction {
    /// The form value for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agregar => "agregar",
            Self::Leer => "leer",
            Self::Actualizar => "actualizar",
            Self::Eliminar => "eliminar",
            Self::Vaciar => "vaciar",
        }
    }
}

/// A cart line as stored by the endpoint, with its server-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCartLine {
    /// Server-assigned id, used to update or delete the line.
    pub id: CartLineId,
    /// Display name, unique within the cart.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Price of one unit.
    #[serde(rename = "precio")]
    pub unit_price: UnitPrice,
    /// Number of units.
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

impl StoredCartLine {
    /// Returns `unit_price * quantity` at full precision.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }

    /// The line without its id.
    #[must_use]
    pub fn to_cart_line(&self) -> CartLine {
        CartLine {
            name: self.name.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }

    /// Build a [`Cart`] from stored lines, checking the cart invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the lines break a cart invariant.
    pub fn into_cart(lines: &[Self]) -> Result<Cart, CartError> {
        Cart::try_from(lines.iter().map(Self::to_cart_line).collect::<Vec<_>>())
    }
}

/// Errors found while validating a contact form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// The raw contact form, exactly as submitted.
///
/// Missing fields deserialize as empty strings so that validation, not
/// decoding, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    /// Sender name.
    #[serde(rename = "nombre", default)]
    pub name: String,
    /// Sender email address.
    #[serde(default)]
    pub email: String,
    /// Message body.
    #[serde(rename = "mensaje", default)]
    pub message: String,
}

impl ContactForm {
    /// Trim and validate the form into a [`ContactMessage`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingField`] for an empty field and
    /// [`ContactError::InvalidEmail`] for a malformed address.
    pub fn validate(&self) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let body = self.message.trim();

        if name.is_empty() {
            return Err(ContactError::MissingField("nombre"));
        }
        if email.is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        if body.is_empty() {
            return Err(ContactError::MissingField("mensaje"));
        }

        Ok(ContactMessage {
            name: name.to_owned(),
            email: Email::parse(email)?,
            body: body.to_owned(),
        })
    }
}

/// A validated contact message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    /// Sender name.
    pub name: String,
    /// Sender email address.
    pub email: Email,
    /// Message body.
    pub body: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            email: email.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_contact_form_trims_fields() {
        let message = form("  Ana ", " ana@example.com ", " Hola ").validate().unwrap();
        assert_eq!(message.name, "Ana");
        assert_eq!(message.email.as_str(), "ana@example.com");
        assert_eq!(message.body, "Hola");
    }

    #[test]
    fn test_contact_form_requires_every_field() {
        assert_eq!(
            form("", "a@b.es", "Hola").validate(),
            Err(ContactError::MissingField("nombre"))
        );
        assert_eq!(
            form("Ana", "   ", "Hola").validate(),
            Err(ContactError::MissingField("email"))
        );
        assert_eq!(
            form("Ana", "a@b.es", "").validate(),
            Err(ContactError::MissingField("mensaje"))
        );
    }

    #[test]
    fn test_contact_form_rejects_bad_email() {
        assert!(matches!(
            form("Ana", "ana-at-example", "Hola").validate(),
            Err(ContactError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_contact_form_missing_fields_decode_as_empty() {
        let form: ContactForm = serde_json::from_str(r#"{"nombre":"Ana"}"#).unwrap();
        assert!(form.email.is_empty());
        assert!(form.message.is_empty());
    }

    #[test]
    fn test_envelope_omits_absent_cart() {
        let json = serde_json::to_value(ApiResponse::ok("hecho")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "hecho" }));
    }

    #[test]
    fn test_envelope_with_cart() {
        let line = StoredCartLine {
            id: CartLineId::new(1),
            name: "Espresso (Grande)".to_owned(),
            unit_price: UnitPrice::parse("2.50").unwrap(),
            quantity: 2,
        };
        let json = serde_json::to_value(ApiResponse::ok("").with_cart(vec![line])).unwrap();
        assert_eq!(
            json["carrito"],
            serde_json::json!([{ "id": 1, "nombre": "Espresso (Grande)", "precio": "2.50", "cantidad": 2 }])
        );
    }

    #[test]
    fn test_stored_lines_into_cart() {
        let lines = [
            StoredCartLine {
                id: CartLineId::new(4),
                name: "Tarta de Chocolate".to_owned(),
                unit_price: UnitPrice::parse("4.50").unwrap(),
                quantity: 2,
            },
            StoredCartLine {
                id: CartLineId::new(9),
                name: "Espresso (Pequeño)".to_owned(),
                unit_price: UnitPrice::parse("1.80").unwrap(),
                quantity: 1,
            },
        ];
        let cart = StoredCartLine::into_cart(&lines).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_display(), "10.80");
    }

    #[test]
    fn test_cart_action_form_values() {
        for action in [
            CartAction::Agregar,
            CartAction::Leer,
            CartAction::Actualizar,
            CartAction::Eliminar,
            CartAction::Vaciar,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}
