//! Reading settings trees from disk.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::flatten::flatten_into;
use crate::{ConfigError, FeatureConfig, Result};

/// Reads a settings tree from a `.json` or `.toml` file.
pub fn load_settings_tree(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::io(path, source))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some("toml") => toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Loads and flattens a settings file into `config`.
pub fn load_feature_config_into(path: &Path, config: &mut FeatureConfig) -> Result<usize> {
    let tree = load_settings_tree(path)?;
    let written = flatten_into(&tree, config)?;
    debug!(path = %path.display(), written, "loaded settings");
    Ok(written)
}

/// Loads and flattens a settings file.
pub fn load_feature_config(path: &Path) -> Result<FeatureConfig> {
    let mut config = FeatureConfig::new();
    load_feature_config_into(path, &mut config)?;
    Ok(config)
}
