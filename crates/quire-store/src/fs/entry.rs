//! Directory entry metadata.

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
}

/// A directory entry as seen by `LocalFs::list`.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    pub kind: DirEntryKind,
}

impl DirEntry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Directory,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::File,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == DirEntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    /// Dot-prefixed entries (`.git`, editor swap files).
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// File stem when the entry is a file with the given extension.
    pub fn stem_with_extension(&self, extension: &str) -> Option<&str> {
        if !self.is_file() {
            return None;
        }
        self.name
            .strip_suffix(extension)
            .and_then(|s| s.strip_suffix('.'))
            .filter(|stem| !stem.is_empty())
    }
}
