//! CLI command implementations.

pub mod contact;
pub mod migrate;
pub mod shop;
