//! Store configuration, read from `config.toml`.
//!
//! ```toml
//! data_dir = "/home/amy/.local/share/quire"
//! workspace = "Default"
//! backend = "git"
//!
//! [git]
//! remote_url = "https://git.example.com/amy/quire-data.git"
//! username = "amy"
//! token = "..."
//! branch = "main"
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::paths;

/// Workspace opened when none is configured.
pub const DEFAULT_WORKSPACE: &str = "Default";

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Commit author when no username is configured.
pub const DEFAULT_AUTHOR: &str = "quire";

/// Which backend persists entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Filesystem,
    Git,
}

/// Remote settings for the git backend. All optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub remote_url: String,
    pub username: String,
    pub token: String,
    pub branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote_url: String::new(),
            username: String::new(),
            token: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl GitConfig {
    /// Pull and push only happen with both a URL and a token.
    pub fn remote_enabled(&self) -> bool {
        !self.remote_url.is_empty() && !self.token.is_empty()
    }

    pub fn author(&self) -> &str {
        if self.username.is_empty() {
            DEFAULT_AUTHOR
        } else {
            &self.username
        }
    }

    pub fn branch(&self) -> &str {
        if self.branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            &self.branch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub workspace: String,
    pub backend: BackendKind,
    pub git: GitConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: paths::data_dir(),
            workspace: DEFAULT_WORKSPACE.to_string(),
            backend: BackendKind::default(),
            git: GitConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load from the default config file, then apply `QUIRE_DATA_DIR`.
    pub fn load() -> StoreResult<Self> {
        let mut config = Self::load_from(&paths::config_file())?;
        if let Ok(dir) = std::env::var(paths::DATA_DIR_ENV) {
            config.override_data_dir(dir);
        }
        Ok(config)
    }

    /// Load from `path`; defaults if the file does not exist.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(StoreError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> StoreResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if config.workspace.is_empty() {
            return Err(StoreError::Config {
                path: path.to_path_buf(),
                message: "workspace must not be empty".to_string(),
            });
        }
        Ok(config)
    }

    /// Ignored when `dir` is empty.
    pub fn override_data_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !dir.as_os_str().is_empty() {
            self.data_dir = dir;
        }
    }
}
