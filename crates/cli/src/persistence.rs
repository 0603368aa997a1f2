//! Local cart persistence.
//!
//! A slot holds the whole cart as a JSON array of
//! `{nombre, precio, cantidad}` lines. Loading never fails: a missing,
//! unreadable or malformed slot (including lines that break a cart invariant)
//! yields an empty cart.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cafe_aroma_core::Cart;
use thiserror::Error;

/// Errors raised while saving a cart.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The slot name cannot be used as a file name.
    #[error("Invalid slot name {0:?}")]
    InvalidSlot(String),
}

/// Where a local cart is kept between runs.
pub trait CartPersistence: Send + Sync {
    /// Load the stored cart, or an empty one.
    fn load(&self) -> Cart;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the cart cannot be written.
    fn save(&self, cart: &Cart) -> Result<(), PersistError>;
}

fn decode(text: &str, origin: &str) -> Cart {
    match serde_json::from_str::<Cart>(text) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(slot = origin, error = %e, "Discarding malformed cart");
            Cart::new()
        }
    }
}

/// A slot stored as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Create a slot in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::InvalidSlot` if the name is empty or contains
    /// path separators.
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Result<Self, PersistError> {
        let valid = !slot.is_empty()
            && slot != "."
            && slot != ".."
            && !slot.contains(['/', '\\']);
        if !valid {
            return Err(PersistError::InvalidSlot(slot.to_owned()));
        }

        Ok(Self {
            path: dir.as_ref().join(format!("{slot}.json")),
        })
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartPersistence for FileSlot {
    fn load(&self) -> Cart {
        let origin = self.path.display().to_string();
        match fs::read_to_string(&self.path) {
            Ok(text) => decode(&text, &origin),
            Err(e) if e.kind() == ErrorKind::NotFound => Cart::new(),
            Err(e) => {
                tracing::warn!(slot = %origin, error = %e, "Could not read cart");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Write then rename so a crash never leaves a half-written slot
        let text = serde_json::to_string(cart)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// A slot held in memory, for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    text: Mutex<Option<String>>,
}

impl MemorySlot {
    /// A slot that already holds the given text.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
        }
    }

    /// The stored text, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.text
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CartPersistence for MemorySlot {
    fn load(&self) -> Cart {
        self.text()
            .map_or_else(Cart::new, |text| decode(&text, "memory"))
    }

    fn save(&self, cart: &Cart) -> Result<(), PersistError> {
        let text = serde_json::to_string(cart)?;
        *self
            .text
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(text);
        Ok(())
    }
}
