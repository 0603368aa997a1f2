//! Café Aroma Core - Shared cart and catalog library.
//!
//! This crate provides the types and logic shared by all Café Aroma components:
//! - `storefront` - The order/cart endpoint and server-rendered cart page
//! - `cli` - The shopper-side client (local or remote cart, contact form)
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, unit prices and emails
//! - [`cart`] - The cart store (add, increment, decrement, remove, clear, total)
//! - [`catalog`] - Product definitions and unit price resolution
//! - [`api`] - Wire types shared by the endpoint and its clients

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod types;

pub use api::{ApiResponse, CartAction, ContactError, ContactForm, ContactMessage, StoredCartLine};
pub use cart::{Cart, CartError, CartLine};
pub use catalog::{Catalog, PricedOption, Product, ProductOptions, Resolved, ResolveError, Selection};
pub use types::*;
