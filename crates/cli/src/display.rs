//! Text output for carts and the menu.

use std::fmt::Write as _;

use cafe_aroma_core::{Catalog, ProductOptions};
use cafe_aroma_storefront::render::{CartView, render_cart};

/// Shown for a cart without lines.
pub const EMPTY_CART: &str = "Tu carrito está vacío.";

/// Plain text listing of a cart, one line per row and the total last.
#[must_use]
pub fn cart_text(view: &CartView) -> String {
    let mut out = String::new();

    if view.items.is_empty() {
        out.push_str(EMPTY_CART);
        out.push('\n');
    }
    for item in &view.items {
        let _ = writeln!(
            out,
            "{} x{}  {} €",
            item.name, item.quantity, item.line_total
        );
    }
    let _ = write!(out, "Total: {} €", view.total);
    out
}

/// The cart list markup followed by its total line.
///
/// # Errors
///
/// Returns `askama::Error` if the template fails to render.
pub fn cart_html(view: &CartView) -> Result<String, askama::Error> {
    Ok(render_cart(view)?.markup)
}

/// The menu with every option and its price.
#[must_use]
pub fn menu_text(catalog: &Catalog) -> String {
    let mut out = String::new();

    for product in &catalog.products {
        let _ = writeln!(out, "{} [{}]", product.name, product.slug);
        match &product.options {
            ProductOptions::Sized { sizes } => {
                for size in sizes {
                    let _ = writeln!(out, "  --opcion \"{}\"  {} €", size.label, size.price);
                }
            }
            ProductOptions::Dropdown { choices } => {
                for choice in choices {
                    let _ = writeln!(out, "  --variante \"{}\"  {} €", choice.label, choice.price);
                }
            }
            ProductOptions::OriginBlend { origins, formats } => {
                for origin in origins {
                    let _ = writeln!(out, "  --variante \"{}\"  {} €", origin.label, origin.price);
                }
                for format in formats {
                    let _ = writeln!(out, "  --opcion \"{format}\"");
                }
            }
            ProductOptions::Flat { price } => {
                let _ = writeln!(out, "  {price} €");
            }
        }
    }
    out
}
