//! Café Aroma shop client.
//!
//! The pieces behind the `cafe` binary, usable on their own:
//!
//! - [`catalog`] - Loading the menu, bundled or from YAML
//! - [`persistence`] - Local cart slots
//! - [`remote`] - HTTP client for the storefront API
//! - [`backend`] - One cart interface over the local slot and the server cart
//! - [`contact`] - Contact form submission state
//! - [`display`] - Text output for carts and the menu

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod contact;
pub mod display;
pub mod error;
pub mod persistence;
pub mod remote;

pub use backend::{CartBackend, LocalCart, RemoteCart};
pub use contact::{ContactSubmitter, ContactTransport, SubmitStatus};
pub use error::ClientError;
pub use persistence::{CartPersistence, FileSlot, MemorySlot, PersistError};
pub use remote::RemoteClient;
