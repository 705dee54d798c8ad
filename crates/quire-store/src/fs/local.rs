//! Local filesystem access rooted at the data directory.
//!
//! All operations are blocking and take paths relative to the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::entry::{DirEntry, DirEntryKind};

/// Local filesystem rooted at the data directory.
///
/// If `root` is `/home/amy/.local/share/quire`, then
/// `read("main/requests/List.yaml")` reads
/// `/home/amy/.local/share/quire/main/requests/List.yaml`.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path within the root.
    ///
    /// Entity names are used verbatim, so a name containing `..` could point
    /// outside the data directory. Components are normalized lexically and
    /// anything that climbs above the root is rejected.
    pub fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let path = path.strip_prefix("/").unwrap_or(path);

        let mut normalized = self.root.clone();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    if normalized == self.root {
                        return Err(io::Error::new(
                            io::ErrorKind::PermissionDenied,
                            format!("path escapes root: {}", path.display()),
                        ));
                    }
                    normalized.pop();
                }
                Component::Normal(c) => normalized.push(c),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        if !normalized.starts_with(&self.root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("path escapes root: {}", path.display()),
            ));
        }
        Ok(normalized)
    }

    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path)?)
    }

    /// Write a whole file. The parent directory must already exist, so a
    /// name containing a separator fails instead of nesting.
    ///
    /// This is a plain overwrite: no fsync and no temp-file swap, so a crash
    /// mid-write can leave a truncated document.
    pub fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(self.resolve(path)?, data)
    }

    /// List a directory, sorted by name.
    pub fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;
        let mut entries = Vec::new();

        for entry in fs::read_dir(&full_path)? {
            let entry = entry?;
            // links are not followed; a linked directory is not a composite
            let kind = if entry.file_type()?.is_dir() {
                DirEntryKind::Directory
            } else {
                DirEntryKind::File
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// True if anything (file, directory, dangling link) exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        self.resolve(path)
            .map(|full| fs::symlink_metadata(full).is_ok())
            .unwrap_or(false)
    }

    /// Create a directory and its parents. Succeeds if it already exists.
    pub fn mkdir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path)?)
    }

    /// Create a single directory; its parent must exist.
    pub fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(self.resolve(path)?)
    }

    /// Rename a file or directory within the root.
    pub fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        fs::rename(&from_path, &to_path)
    }

    /// Remove a single file.
    pub fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(self.resolve(path)?)
    }

    /// Remove a directory and everything under it.
    pub fn remove_all(&self, path: &Path) -> io::Result<()> {
        let full_path = self.resolve(path)?;
        if full_path == self.root {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to remove the data root",
            ));
        }
        fs::remove_dir_all(full_path)
    }
}
