//! Session-backed models for the storefront.

pub mod session;

pub use session::{CART_KEY, current_cart_key, ensure_cart_key};
