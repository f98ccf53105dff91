// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a pipeline file and return the raw [`RawConfigFile`].
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// structural checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Parse a pipeline from TOML text.
pub fn load_from_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a pipeline file and validate it.
///
/// Checks that there is at least one task and that no task has an empty
/// command. Graph problems (unknown `after` names, cycles) are reported later
/// by `Runner::validate`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// `Deptask.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Deptask.toml")
}
