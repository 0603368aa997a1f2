//! Core types for Café Aroma.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{MAX_UNIT_PRICE, PriceError, UnitPrice, format_amount};
