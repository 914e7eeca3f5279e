//! Location of the adsnip config file.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Directory holding `config.toml`.
///
/// Follows the platform convention from [`ProjectDirs`]; on Linux this is
/// `$XDG_CONFIG_HOME/adsnip`, falling back to `~/.config/adsnip`.
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Path read by `adsnip` at startup and written by `adsnip config init`.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
