//! XDG Base Directory paths for quire.
//!
//! | Purpose | XDG Variable | Default | quire Path |
//! |---------|--------------|---------|------------|
//! | Entities | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/quire/` |
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/quire/config.toml` |
//!
//! `QUIRE_DATA_DIR` overrides the entity root (see [`crate::config`]).

use std::path::PathBuf;

use directories::BaseDirs;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "QUIRE_DATA_DIR";

/// Get the data directory holding workspaces.
///
/// Uses `$XDG_DATA_HOME/quire` or falls back to `~/.local/share/quire`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".local").join("share"))
        .join("quire")
}

/// Get the config directory.
///
/// Uses `$XDG_CONFIG_HOME/quire` or falls back to `~/.config/quire`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("quire")
}

/// Default location of `config.toml`.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Fallback home directory when BaseDirs fails.
fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
