//! Blocking disk access for the storage backends.

mod entry;
mod local;

pub use entry::{DirEntry, DirEntryKind};
pub use local::LocalFs;
