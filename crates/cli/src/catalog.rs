//! Menu loading.

use std::path::{Path, PathBuf};

use cafe_aroma_core::Catalog;
use thiserror::Error;

/// Errors raised while loading a menu file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read menu {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid menu {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Parse a menu from YAML text.
///
/// # Errors
///
/// Returns the YAML error if the text does not describe a catalog.
pub fn parse_catalog(text: &str) -> Result<Catalog, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// Load the menu from `path`, or the bundled café menu when no path is given.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let Some(path) = path else {
        return Ok(Catalog::cafe_menu());
    };

    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_owned(),
        source,
    })?;
    let catalog = parse_catalog(&text).map_err(|source| CatalogError::Parse {
        path: path.to_owned(),
        source,
    })?;

    tracing::debug!(path = %path.display(), products = catalog.products.len(), "Loaded menu");
    Ok(catalog)
}
