// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{GroupSettings, RawGroupSettings};
use crate::errors::ConfigError;

/// Read and validate group settings from a TOML file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<GroupSettings, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    from_toml_str(&contents)
}

/// Parse and validate group settings from TOML text.
pub fn from_toml_str(contents: &str) -> Result<GroupSettings, ConfigError> {
    let raw: RawGroupSettings = toml::from_str(contents)?;
    GroupSettings::try_from(raw)
}
