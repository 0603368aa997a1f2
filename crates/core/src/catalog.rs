//! Product catalog and unit price resolution.
//!
//! Every product carries exactly one kind of option widget, modelled as
//! [`ProductOptions`]. Each variant owns its extraction rule, so resolving a
//! price is a `match` on the product kind rather than guessing from which
//! inputs happen to be present.
//!
//! Prices are stored as the decimal text the menu was written with and are
//! parsed on every resolution; malformed text is a resolution failure.

use serde::{Deserialize, Serialize};

use crate::types::{PriceError, UnitPrice};

/// Format assumed for [`ProductOptions::OriginBlend`] when none is chosen.
pub const DEFAULT_BEAN_FORMAT: &str = "En Grano";

/// Errors that can occur when resolving a product selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No product with this slug exists in the catalog.
    #[error("unknown product {0:?}")]
    UnknownProduct(String),
    /// The selection does not determine a price for the product.
    #[error("could not determine a price for {0:?}")]
    Unresolvable(String),
    /// The selection names an option the product does not offer.
    #[error("{product:?} has no option {option:?}")]
    UnknownOption {
        /// Product display name.
        product: String,
        /// The option that was asked for.
        option: String,
    },
    /// The matched option carries malformed price text.
    #[error("invalid price for {product:?}: {source}")]
    InvalidPrice {
        /// Product display name.
        product: String,
        /// Underlying parse failure.
        source: PriceError,
    },
}

/// A selectable option that carries its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedOption {
    /// Label shown to the shopper and used in the line name.
    pub label: String,
    /// Unit price as decimal text.
    pub price: String,
    /// Whether this option is pre-selected.
    #[serde(default)]
    pub default: bool,
}

impl PricedOption {
    /// Create a non-default option.
    #[must_use]
    pub fn new(label: &str, price: &str) -> Self {
        Self {
            label: label.to_owned(),
            price: price.to_owned(),
            default: false,
        }
    }

    /// Mark this option as pre-selected.
    #[must_use]
    pub const fn preselected(mut self) -> Self {
        self.default = true;
        self
    }
}

/// The option widget a product carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductOptions {
    /// A radio group of sizes; the checked radio gives price and label.
    Sized {
        /// Available sizes.
        sizes: Vec<PricedOption>,
    },
    /// A dropdown; the selected option gives price and label.
    Dropdown {
        /// Available choices. The first one is selected unless another is
        /// marked as default.
        choices: Vec<PricedOption>,
    },
    /// A dropdown of origins (priced) combined with a radio group of bean
    /// formats (unpriced).
    OriginBlend {
        /// Available origins.
        origins: Vec<PricedOption>,
        /// Available formats.
        formats: Vec<String>,
    },
    /// No options; the price is attached to the product itself.
    Flat {
        /// Unit price as decimal text.
        price: String,
    },
}

/// A product on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier used on the command line and in links.
    pub slug: String,
    /// Base display name.
    pub name: String,
    /// The product's option widget.
    pub options: ProductOptions,
}

/// The shopper's choices for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Label of the checked size or format radio.
    pub radio: Option<String>,
    /// Label of the selected dropdown option.
    pub dropdown: Option<String>,
}

/// The outcome of a successful resolution: what goes into the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Line name, including the chosen variant.
    pub name: String,
    /// Unit price of that variant.
    pub unit_price: UnitPrice,
}

impl Product {
    /// Resolve the unit price and line name for a selection.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolvable`] when no option is selected and
    /// none is pre-selected, [`ResolveError::UnknownOption`] when the
    /// selection names an option the product lacks, and
    /// [`ResolveError::InvalidPrice`] when the matched price text is malformed.
    pub fn resolve(&self, selection: &Selection) -> Result<Resolved, ResolveError> {
        match &self.options {
            ProductOptions::Sized { sizes } => {
                let size = self.pick(sizes, selection.radio.as_deref(), false)?;
                self.resolved(&format!("{} ({})", self.name, size.label), &size.price)
            }
            ProductOptions::Dropdown { choices } => {
                let choice = self.pick(choices, selection.dropdown.as_deref(), true)?;
                self.resolved(&format!("{} ({})", self.name, choice.label), &choice.price)
            }
            ProductOptions::OriginBlend { origins, formats } => {
                let origin = self.pick(origins, selection.dropdown.as_deref(), true)?;
                let format = match selection.radio.as_deref() {
                    Some(wanted) => formats
                        .iter()
                        .find(|f| f.as_str() == wanted)
                        .map(String::as_str)
                        .ok_or_else(|| self.unknown_option(wanted))?,
                    None => DEFAULT_BEAN_FORMAT,
                };
                self.resolved(
                    &format!("{} ({}, {format})", self.name, origin.label),
                    &origin.price,
                )
            }
            ProductOptions::Flat { price } => self.resolved(&self.name, price),
        }
    }

    /// Find the selected option, falling back to the pre-selected one.
    ///
    /// Dropdowns always have a selection, so they fall back to their first
    /// entry; radio groups only fall back to an explicitly checked option.
    fn pick<'a>(
        &self,
        options: &'a [PricedOption],
        wanted: Option<&str>,
        first_is_default: bool,
    ) -> Result<&'a PricedOption, ResolveError> {
        if let Some(wanted) = wanted {
            return options
                .iter()
                .find(|option| option.label == wanted)
                .ok_or_else(|| self.unknown_option(wanted));
        }

        options
            .iter()
            .find(|option| option.default)
            .or_else(|| first_is_default.then_some(options.first()).flatten())
            .ok_or_else(|| ResolveError::Unresolvable(self.name.clone()))
    }

    fn resolved(&self, name: &str, price: &str) -> Result<Resolved, ResolveError> {
        let unit_price = UnitPrice::parse(price).map_err(|source| ResolveError::InvalidPrice {
            product: self.name.clone(),
            source,
        })?;
        Ok(Resolved {
            name: name.to_owned(),
            unit_price,
        })
    }

    fn unknown_option(&self, option: &str) -> ResolveError {
        ResolveError::UnknownOption {
            product: self.name.clone(),
            option: option.to_owned(),
        }
    }
}

/// The menu: an ordered list of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Products in menu order.
    pub products: Vec<Product>,
}

impl Catalog {
    /// Look up a product by slug.
    #[must_use]
    pub fn product(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.slug == slug)
    }

    /// Resolve a selection for the product with the given slug.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownProduct`] if the slug is not on the
    /// menu, otherwise whatever [`Product::resolve`] reports.
    pub fn resolve(&self, slug: &str, selection: &Selection) -> Result<Resolved, ResolveError> {
        self.product(slug)
            .ok_or_else(|| ResolveError::UnknownProduct(slug.to_owned()))?
            .resolve(selection)
    }

    /// The Café Aroma menu.
    #[must_use]
    pub fn cafe_menu() -> Self {
        let sized = |slug: &str, name: &str, small: &str, large: &str| Product {
            slug: slug.to_owned(),
            name: name.to_owned(),
            options: ProductOptions::Sized {
                sizes: vec![
                    PricedOption::new("Pequeño", small).preselected(),
                    PricedOption::new("Grande", large),
                ],
            },
        };

        Self {
            products: vec![
                sized("espresso", "Espresso", "1.80", "2.50"),
                sized("capuchino", "Capuchino", "2.20", "2.90"),
                sized("cafe-latte", "Café Latte", "2.50", "3.20"),
                Product {
                    slug: "te".to_owned(),
                    name: "Té e Infusiones".to_owned(),
                    options: ProductOptions::Dropdown {
                        choices: vec![
                            PricedOption::new("Té Verde", "2.00"),
                            PricedOption::new("Té Negro", "2.00"),
                            PricedOption::new("Manzanilla", "1.80"),
                            PricedOption::new("Rooibos", "2.20"),
                        ],
                    },
                },
                Product {
                    slug: "cafe-de-origen".to_owned(),
                    name: "Café de Origen".to_owned(),
                    options: ProductOptions::OriginBlend {
                        origins: vec![
                            PricedOption::new("Colombia", "12.50"),
                            PricedOption::new("Etiopía", "14.00"),
                            PricedOption::new("Brasil", "11.00"),
                        ],
                        formats: vec!["Molido".to_owned(), DEFAULT_BEAN_FORMAT.to_owned()],
                    },
                },
                Product {
                    slug: "tarta-de-chocolate".to_owned(),
                    name: "Tarta de Chocolate".to_owned(),
                    options: ProductOptions::Flat {
                        price: "4.50".to_owned(),
                    },
                },
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::cafe_menu()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn radio(label: &str) -> Selection {
        Selection {
            radio: Some(label.to_owned()),
            dropdown: None,
        }
    }

    fn dropdown(label: &str) -> Selection {
        Selection {
            radio: None,
            dropdown: Some(label.to_owned()),
        }
    }

    #[test]
    fn test_sized_product_uses_checked_radio() {
        let menu = Catalog::cafe_menu();
        let resolved = menu.resolve("espresso", &radio("Grande")).unwrap();
        assert_eq!(resolved.name, "Espresso (Grande)");
        assert_eq!(resolved.unit_price.to_string(), "2.50");
    }

    #[test]
    fn test_sized_product_falls_back_to_preselected_size() {
        let menu = Catalog::cafe_menu();
        let resolved = menu.resolve("capuchino", &Selection::default()).unwrap();
        assert_eq!(resolved.name, "Capuchino (Pequeño)");
        assert_eq!(resolved.unit_price.to_string(), "2.20");
    }

    #[test]
    fn test_sized_product_without_checked_radio_is_unresolvable() {
        let product = Product {
            slug: "x".to_owned(),
            name: "Espresso".to_owned(),
            options: ProductOptions::Sized {
                sizes: vec![PricedOption::new("Grande", "2.50")],
            },
        };
        assert_eq!(
            product.resolve(&Selection::default()),
            Err(ResolveError::Unresolvable("Espresso".to_owned()))
        );
    }

    #[test]
    fn test_dropdown_uses_selected_option() {
        let menu = Catalog::cafe_menu();
        let resolved = menu.resolve("te", &dropdown("Rooibos")).unwrap();
        assert_eq!(resolved.name, "Té e Infusiones (Rooibos)");
        assert_eq!(resolved.unit_price.to_string(), "2.20");
    }

    #[test]
    fn test_dropdown_defaults_to_first_option() {
        let menu = Catalog::cafe_menu();
        let resolved = menu.resolve("te", &Selection::default()).unwrap();
        assert_eq!(resolved.name, "Té e Infusiones (Té Verde)");
    }

    #[test]
    fn test_origin_blend_builds_composite_name() {
        let menu = Catalog::cafe_menu();
        let selection = Selection {
            radio: Some("Molido".to_owned()),
            dropdown: Some("Etiopía".to_owned()),
        };
        let resolved = menu.resolve("cafe-de-origen", &selection).unwrap();
        assert_eq!(resolved.name, "Café de Origen (Etiopía, Molido)");
        assert_eq!(resolved.unit_price.to_string(), "14.00");
    }

    #[test]
    fn test_origin_blend_defaults_format_to_beans() {
        let menu = Catalog::cafe_menu();
        let resolved = menu.resolve("cafe-de-origen", &dropdown("Brasil")).unwrap();
        assert_eq!(resolved.name, "Café de Origen (Brasil, En Grano)");
    }

    #[test]
    fn test_flat_product_uses_attached_price() {
        let menu = Catalog::cafe_menu();
        let resolved = menu
            .resolve("tarta-de-chocolate", &Selection::default())
            .unwrap();
        assert_eq!(resolved.name, "Tarta de Chocolate");
        assert_eq!(resolved.unit_price.to_string(), "4.50");
    }

    #[test]
    fn test_unknown_product_and_option() {
        let menu = Catalog::cafe_menu();
        assert_eq!(
            menu.resolve("croissant", &Selection::default()),
            Err(ResolveError::UnknownProduct("croissant".to_owned()))
        );
        assert!(matches!(
            menu.resolve("espresso", &radio("Mediano")),
            Err(ResolveError::UnknownOption { .. })
        ));
        assert!(matches!(
            menu.resolve("cafe-de-origen", &radio("Cápsulas")),
            Err(ResolveError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_malformed_price_text_fails_resolution() {
        let product = Product {
            slug: "tarta".to_owned(),
            name: "Tarta".to_owned(),
            options: ProductOptions::Flat {
                price: "cuatro".to_owned(),
            },
        };
        assert!(matches!(
            product.resolve(&Selection::default()),
            Err(ResolveError::InvalidPrice {
                source: PriceError::Malformed(_),
                ..
            })
        ));
    }

    #[test]
    fn test_catalog_deserializes_tagged_options() {
        let json = r#"{
            "products": [
                { "slug": "tarta", "name": "Tarta", "options": { "kind": "flat", "price": "4.00" } },
                { "slug": "te", "name": "Té", "options": { "kind": "dropdown",
                    "choices": [ { "label": "Verde", "price": "2.00" } ] } }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(
            catalog.resolve("te", &Selection::default()).unwrap().name,
            "Té (Verde)"
        );
    }
}
