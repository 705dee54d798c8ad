//! ID → name map used to detect renames.

use std::collections::HashMap;

/// Last known on-disk name of every entity this backend has loaded or written.
///
/// Owned by one backend instance and never shared. Entries live until the
/// entity is deleted or the backend is dropped. Files changed on disk by
/// anything other than the owning backend are not noticed.
#[derive(Debug, Default)]
pub struct IdentityCache {
    names: HashMap<String, String>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Drop an entry. Returns the name it held.
    pub fn forget(&mut self, id: &str) -> Option<String> {
        self.names.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
