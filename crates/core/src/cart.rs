//! The cart store.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s keyed by display name. The
//! display name already encodes the chosen variant (`"Espresso (Grande)"`), so
//! two variants of the same product are two separate lines.
//!
//! ## Invariants
//!
//! - No two lines share a name
//! - Every line has a quantity of at least 1; a line that would drop to 0 is removed
//! - Lines keep the order in which they were first added
//!
//! Every mutation either applies completely or leaves the cart untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{UnitPrice, format_amount};

/// Errors reported by cart operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The line name is empty or only whitespace.
    #[error("product name cannot be empty")]
    EmptyName,
    /// A quantity of zero was supplied where at least one unit is required.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The quantity would exceed the representable range.
    #[error("quantity for {0:?} is too large")]
    QuantityOverflow(String),
    /// Two lines share the same name.
    #[error("duplicate cart line {0:?}")]
    DuplicateLine(String),
    /// No line with the given name exists.
    #[error("{0:?} is not in the cart")]
    NotFound(String),
}

/// A single product line in the cart.
///
/// Serialized with the field names of the persisted cart format
/// (`nombre`, `precio`, `cantidad`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Display name, unique within the cart.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Price of one unit.
    #[serde(rename = "precio")]
    pub unit_price: UnitPrice,
    /// Number of units, always at least 1 inside a [`Cart`].
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

impl CartLine {
    /// Returns `unit_price * quantity` at full precision.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// An ordered collection of cart lines.
///
/// Serializes as a plain JSON array of lines. Deserializing validates the
/// invariants, so a persisted cart with duplicate names or zero quantities is
/// rejected as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Returns the lines in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line with the given name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.name == name)
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add `quantity` units of a product.
    ///
    /// If a line with `name` exists its quantity grows and its unit price is
    /// kept; otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyName`] or [`CartError::ZeroQuantity`] for
    /// invalid input, and [`CartError::QuantityOverflow`] if the quantity would
    /// not fit. The cart is unchanged on error.
    pub fn add(
        &mut self,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<&Self, CartError> {
        if name.trim().is_empty() {
            return Err(CartError::EmptyName);
        }
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.name == name) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| CartError::QuantityOverflow(name.to_owned()))?;
        } else {
            self.lines.push(CartLine {
                name: name.to_owned(),
                unit_price,
                quantity,
            });
        }

        Ok(self)
    }

    /// Add one unit to an existing line and return its new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has that name.
    pub fn increment(&mut self, name: &str) -> Result<u32, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.name == name)
            .ok_or_else(|| CartError::NotFound(name.to_owned()))?;

        line.quantity = line
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::QuantityOverflow(name.to_owned()))?;
        Ok(line.quantity)
    }

    /// Remove one unit from an existing line.
    ///
    /// Returns the remaining quantity, or `None` if the line reached zero and
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has that name.
    pub fn decrement(&mut self, name: &str) -> Result<Option<u32>, CartError> {
        let index = self
            .position(name)
            .ok_or_else(|| CartError::NotFound(name.to_owned()))?;

        let remaining = self
            .lines
            .get_mut(index)
            .map_or(0, |line| {
                line.quantity = line.quantity.saturating_sub(1);
                line.quantity
            });

        if remaining == 0 {
            self.lines.remove(index);
            return Ok(None);
        }

        Ok(Some(remaining))
    }

    /// Delete a line regardless of its quantity and return it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no line has that name.
    pub fn remove(&mut self, name: &str) -> Result<CartLine, CartError> {
        let index = self
            .position(name)
            .ok_or_else(|| CartError::NotFound(name.to_owned()))?;
        Ok(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over all lines, at full precision.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// The total formatted with exactly two decimal places.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_amount(self.total())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.name == name)
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.name.trim().is_empty() {
                return Err(CartError::EmptyName);
            }
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity);
            }
            if !seen.insert(line.name.as_str()) {
                return Err(CartError::DuplicateLine(line.name.clone()));
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(text: &str) -> UnitPrice {
        UnitPrice::parse(text).unwrap()
    }

    fn assert_invariants(cart: &Cart) {
        let mut names: Vec<&str> = cart.lines().iter().map(|l| l.name.as_str()).collect();
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), cart.len());

        let expected: Decimal = cart
            .lines()
            .iter()
            .map(|l| l.unit_price.amount() * Decimal::from(l.quantity))
            .sum();
        assert_eq!(cart.total(), expected);
    }

    #[test]
    fn test_add_same_name_twice_merges() {
        let mut cart = Cart::new();
        cart.add("Espresso (Grande)", price("2.50"), 1).unwrap();
        cart.add("Espresso (Grande)", price("2.50"), 1).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("Espresso (Grande)").unwrap().quantity, 2);
        assert_eq!(cart.total_display(), "5.00");
    }

    #[test]
    fn test_add_keeps_first_add_order() {
        let mut cart = Cart::new();
        cart.add("Capuchino (Pequeño)", price("2.20"), 1).unwrap();
        cart.add("Tarta de Chocolate", price("4.00"), 1).unwrap();
        cart.add("Capuchino (Pequeño)", price("2.20"), 3).unwrap();

        let names: Vec<_> = cart.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Capuchino (Pequeño)", "Tarta de Chocolate"]);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_add_existing_line_keeps_original_price() {
        let mut cart = Cart::new();
        cart.add("Tarta de Chocolate", price("4.00"), 1).unwrap();
        cart.add("Tarta de Chocolate", price("9.00"), 1).unwrap();

        assert_eq!(cart.get("Tarta de Chocolate").unwrap().unit_price, price("4.00"));
    }

    #[test]
    fn test_add_rejects_invalid_input_without_mutation() {
        let mut cart = Cart::new();
        assert_eq!(cart.add("  ", price("1"), 1).unwrap_err(), CartError::EmptyName);
        assert_eq!(cart.add("Espresso", price("1"), 0).unwrap_err(), CartError::ZeroQuantity);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add("Espresso", price("1"), u32::MAX).unwrap();
        assert!(matches!(
            cart.add("Espresso", price("1"), 1),
            Err(CartError::QuantityOverflow(_))
        ));
        assert_eq!(cart.get("Espresso").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::new();
        cart.add("Café Latte (Grande)", price("3.20"), 1).unwrap();

        assert_eq!(cart.increment("Café Latte (Grande)").unwrap(), 2);
        assert_eq!(cart.decrement("Café Latte (Grande)").unwrap(), Some(1));
        assert_eq!(cart.total_display(), "3.20");
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add("Espresso (Pequeño)", price("1.80"), 1).unwrap();

        assert_eq!(cart.decrement("Espresso (Pequeño)").unwrap(), None);
        assert!(cart.get("Espresso (Pequeño)").is_none());
        assert!(cart.is_empty());
        assert_eq!(cart.total_display(), "0.00");
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let mut cart = Cart::new();
        assert!(matches!(cart.increment("Nada"), Err(CartError::NotFound(_))));
        assert!(matches!(cart.decrement("Nada"), Err(CartError::NotFound(_))));
        assert!(matches!(cart.remove("Nada"), Err(CartError::NotFound(_))));
    }

    #[test]
    fn test_remove_ignores_quantity() {
        let mut cart = Cart::new();
        cart.add("Té e Infusiones (Té Verde)", price("2.00"), 4).unwrap();
        cart.add("Espresso (Grande)", price("2.50"), 1).unwrap();

        let removed = cart.remove("Té e Infusiones (Té Verde)").unwrap();
        assert_eq!(removed.quantity, 4);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_display(), "2.50");
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add("Espresso (Grande)", price("2.50"), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_total_uses_full_precision() {
        let mut cart = Cart::new();
        cart.add("A", price("0.335"), 1).unwrap();
        cart.add("B", price("0.335"), 1).unwrap();

        // 0.67 exactly; rounding each line first would give 0.68
        assert_eq!(cart.total(), Decimal::new(670, 3));
        assert_eq!(cart.total_display(), "0.67");
    }

    #[test]
    fn test_invariants_hold_over_operation_sequences() {
        let names = ["Espresso (Grande)", "Capuchino (Pequeño)", "Tarta de Chocolate"];
        let mut cart = Cart::new();

        // Deterministic pseudo-random walk over all operations
        let mut seed: u32 = 17;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let name = names[(seed >> 8) as usize % names.len()];
            match (seed >> 16) % 4 {
                0 => {
                    let _ = cart.add(name, price("1.25"), (seed >> 4) % 3 + 1);
                }
                1 => {
                    let _ = cart.increment(name);
                }
                2 => {
                    let _ = cart.decrement(name);
                }
                _ => {
                    let _ = cart.remove(name);
                }
            }
            assert_invariants(&cart);
        }
    }

    #[test]
    fn test_total_of_largest_lines_does_not_overflow() {
        let mut cart = Cart::new();
        cart.add("Barrica", price("1000000"), u32::MAX).unwrap();
        cart.add("Tostadora", price("999999.99"), u32::MAX).unwrap();

        assert_eq!(cart.total_display(), "8589934547050327.05");
    }

    #[test]
    fn test_add_rejects_out_of_range_price_text() {
        let huge = r#"[{"nombre":"X","precio":"79228162514264337593543950335","cantidad":2}]"#;
        assert!(serde_json::from_str::<Cart>(huge).is_err());
    }

    #[test]
    fn test_serializes_as_persisted_array() {
        let mut cart = Cart::new();
        cart.add("Espresso (Grande)", price("2.50"), 2).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "nombre": "Espresso (Grande)", "precio": "2.50", "cantidad": 2 }])
        );
    }

    #[test]
    fn test_deserialize_accepts_numeric_prices() {
        let cart: Cart =
            serde_json::from_str(r#"[{"nombre":"Tarta de Chocolate","precio":4.5,"cantidad":1}]"#)
                .unwrap();
        assert_eq!(cart.total_display(), "4.50");
    }

    #[test]
    fn test_deserialize_rejects_broken_invariants() {
        let zero = r#"[{"nombre":"A","precio":"1","cantidad":0}]"#;
        let dup = r#"[{"nombre":"A","precio":"1","cantidad":1},{"nombre":"A","precio":"1","cantidad":1}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());
        assert!(serde_json::from_str::<Cart>(dup).is_err());
    }
}
