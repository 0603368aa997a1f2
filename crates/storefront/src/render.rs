//! Cart rendering.
//!
//! A [`CartView`] is built from either a local [`Cart`] (controls address
//! lines by name) or the stored lines returned by the endpoint (controls
//! address lines by id). Rendering is a pure function of the view.

use askama::Template;
use askama_web::WebTemplate;
use cafe_aroma_core::{Cart, StoredCartLine, format_amount};
use rust_decimal::Decimal;

/// Attribute carrying a line id on the row controls.
const ID_ATTR: &str = "data-id";
/// Attribute carrying a line name on the row controls.
const NAME_ATTR: &str = "data-nombre";

/// One cart row, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    /// Attribute the row controls use to address the line.
    pub target_attr: &'static str,
    /// Value of [`Self::target_attr`].
    pub target_value: String,
    pub name: String,
    pub quantity: u32,
    /// Line total with two decimals.
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Cart total with two decimals.
    pub total: String,
    /// Sum of quantities.
    pub item_count: u64,
}

impl CartView {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: format_amount(Decimal::ZERO),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    target_attr: NAME_ATTR,
                    target_value: line.name.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: format_amount(line.subtotal()),
                })
                .collect(),
            total: cart.total_display(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&[StoredCartLine]> for CartView {
    fn from(lines: &[StoredCartLine]) -> Self {
        let total: Decimal = lines.iter().map(StoredCartLine::subtotal).sum();
        Self {
            items: lines
                .iter()
                .map(|line| CartItemView {
                    target_attr: ID_ATTR,
                    target_value: line.id.to_string(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: format_amount(line.subtotal()),
                })
                .collect(),
            total: format_amount(total),
            item_count: lines.iter().map(|line| u64::from(line.quantity)).sum(),
        }
    }
}

/// Cart items fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub shop_name: String,
}

/// Rendered cart: list markup plus the two-decimal total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCart {
    pub markup: String,
    pub total: String,
}

/// Render the cart list and total.
///
/// # Errors
///
/// Returns `askama::Error` if the template fails to render.
pub fn render_cart(view: &CartView) -> Result<RenderedCart, askama::Error> {
    let markup = CartItemsTemplate { cart: view.clone() }.render()?;
    Ok(RenderedCart {
        markup,
        total: view.total.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_aroma_core::{CartLineId, UnitPrice};

    use super::*;

    fn price(text: &str) -> UnitPrice {
        UnitPrice::parse(text).unwrap()
    }

    #[test]
    fn test_empty_cart_placeholder() {
        let rendered = render_cart(&CartView::from(&Cart::new())).unwrap();

        assert_eq!(rendered.total, "0.00");
        assert_eq!(rendered.markup.matches("<li").count(), 1);
        assert!(rendered.markup.contains("Tu carrito está vacío."));
        assert_eq!(CartView::from(&Cart::new()), CartView::empty());
    }

    #[test]
    fn test_local_rows_address_lines_by_name() {
        let mut cart = Cart::new();
        cart.add("Espresso (Grande)", price("2.50"), 2).unwrap();

        let rendered = render_cart(&CartView::from(&cart)).unwrap();

        assert_eq!(rendered.total, "5.00");
        assert!(rendered.markup.contains(r#"data-nombre="Espresso (Grande)""#));
        assert!(rendered.markup.contains("x2"));
        assert!(rendered.markup.contains("5.00 €"));
        assert!(!rendered.markup.contains("carrito-vacio"));
    }

    #[test]
    fn test_stored_rows_address_lines_by_id() {
        let lines = vec![
            StoredCartLine {
                id: CartLineId::new(12),
                name: "Tarta de Chocolate".to_owned(),
                unit_price: price("4.50"),
                quantity: 1,
            },
            StoredCartLine {
                id: CartLineId::new(15),
                name: "Café de Origen (Etiopía, Molido)".to_owned(),
                unit_price: price("14.00"),
                quantity: 2,
            },
        ];

        let view = CartView::from(lines.as_slice());
        let rendered = render_cart(&view).unwrap();

        assert_eq!(view.item_count, 3);
        assert_eq!(rendered.total, "32.50");
        assert!(rendered.markup.contains(r#"data-id="12""#));
        assert!(rendered.markup.contains(r#"data-id="15""#));
        assert!(!rendered.markup.contains("data-nombre"));
    }

    #[test]
    fn test_stored_rows_at_price_and_quantity_limits() {
        let lines = vec![
            StoredCartLine {
                id: CartLineId::new(1),
                name: "Barrica".to_owned(),
                unit_price: price("1000000"),
                quantity: u32::MAX,
            },
            StoredCartLine {
                id: CartLineId::new(2),
                name: "Tostadora".to_owned(),
                unit_price: price("999999.99"),
                quantity: u32::MAX,
            },
        ];

        let view = CartView::from(lines.as_slice());
        assert_eq!(view.total, "8589934547050327.05");
        assert_eq!(view.item_count, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_names_are_escaped() {
        let mut cart = Cart::new();
        cart.add("<script>alert(1)</script>", price("1.00"), 1).unwrap();

        let rendered = render_cart(&CartView::from(&cart)).unwrap();
        assert!(!rendered.markup.contains("<script>"));
        assert!(rendered.markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let mut cart = Cart::new();
        cart.add("Capuchino (Pequeño)", price("2.20"), 1).unwrap();
        cart.add("Té e Infusiones (Té Verde)", price("2.00"), 3).unwrap();
        let view = CartView::from(&cart);

        assert_eq!(render_cart(&view).unwrap(), render_cart(&view).unwrap());
    }

    #[test]
    fn test_page_includes_fragment() {
        let mut cart = Cart::new();
        cart.add("Espresso (Pequeño)", price("1.80"), 1).unwrap();

        let page = CartShowTemplate {
            cart: CartView::from(&cart),
            shop_name: "Café Aroma".to_owned(),
        }
        .render()
        .unwrap();

        assert!(page.contains("Tu carrito | Café Aroma"));
        assert!(page.contains(r#"id="lista-carrito""#));
        assert!(page.contains("finalizar-pedido"));
    }
}
