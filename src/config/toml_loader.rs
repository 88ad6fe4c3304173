//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::CatalogError;

/// Load and deserialize `path`, returning `None` when the file does not exist.
///
/// # Errors
///
/// Returns [`CatalogError::Load`] if the file exists but cannot be read or
/// parsed.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CatalogError> {
    if !path.exists() {
        return Ok(None);
    }

    let load_err = |message: String| CatalogError::Load {
        path: path.to_path_buf(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| load_err(e.to_string()))
}
