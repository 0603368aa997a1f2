//! Client-side errors.

use cafe_aroma_core::{CartError, ResolveError};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::persistence::PersistError;

/// Errors raised by the shop client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got an answer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server URL is malformed.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with `success: false`.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the envelope, meant for the shopper.
        message: String,
    },

    /// The server answered with something other than the envelope.
    #[error("Unexpected response ({status}): {detail}")]
    UnexpectedResponse {
        /// HTTP status code.
        status: u16,
        /// Start of the body, or what was missing.
        detail: String,
    },

    /// Checkout was asked for with nothing in the cart.
    #[error("Tu carrito está vacío.")]
    EmptyCart,

    /// No cart line has this name.
    #[error("{0:?} is not in the cart")]
    NotInCart(String),

    /// The local cart refused the change.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The product selection could not be priced.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The menu could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Local state could not be read or written.
    #[error(transparent)]
    Persist(#[from] PersistError),
}
