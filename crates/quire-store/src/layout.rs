//! Path resolution: which directory holds an entity of a given kind.
//!
//! ```text
//! <data root>/
//!   preferences.yaml
//!   <workspace>/
//!     _workspace.yaml
//!     collections/<collection>/{_collection.yaml, <request>.yaml}
//!     environments/<environment>.yaml
//!     requests/<request>.yaml
//!     protofiles/<proto file>.yaml
//! ```
//!
//! All paths are relative to the data root. Resolving a directory creates it
//! if it does not exist yet.

use std::path::{Path, PathBuf};

use quire_types::{Collection, Kind};
use tracing::debug;

use crate::error::{IoContext, StoreResult};
use crate::fs::LocalFs;

/// File holding user preferences, directly under the data root.
pub const PREFERENCES_FILE: &str = "preferences.yaml";

#[derive(Debug, Clone)]
pub struct Layout {
    fs: LocalFs,
}

impl Layout {
    pub fn new(fs: LocalFs) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &LocalFs {
        &self.fs
    }

    /// Directory of a workspace. Not created.
    pub fn workspace_dir(&self, workspace: &str) -> PathBuf {
        PathBuf::from(workspace)
    }

    /// Directory holding entities of `kind` in `workspace`, created on demand.
    ///
    /// Workspaces live directly under the data root, so `workspace` is
    /// ignored for [`Kind::Workspace`].
    pub fn entity_dir(&self, kind: Kind, workspace: &str) -> StoreResult<PathBuf> {
        let dir = match kind.dir_name() {
            Some(name) => self.workspace_dir(workspace).join(name),
            None => PathBuf::new(),
        };
        self.ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Directory of a collection; its requests are stored here too.
    pub fn collection_dir(&self, workspace: &str, collection: &str) -> StoreResult<PathBuf> {
        let dir = self.entity_dir(Kind::Collection, workspace)?.join(collection);
        self.ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Directory a request lives in: its collection's, or `requests/`.
    pub fn request_dir(
        &self,
        workspace: &str,
        collection: Option<&Collection>,
    ) -> StoreResult<PathBuf> {
        match collection {
            Some(c) => self.collection_dir(workspace, &c.metadata.name),
            None => self.entity_dir(Kind::Request, workspace),
        }
    }

    pub fn preferences_path(&self) -> PathBuf {
        PathBuf::from(PREFERENCES_FILE)
    }

    fn ensure_dir(&self, dir: &Path) -> StoreResult<()> {
        if self.fs.exists(dir) {
            return Ok(());
        }
        debug!(dir = %dir.display(), "creating directory");
        self.fs.mkdir(dir).at("create directory", dir)
    }
}
