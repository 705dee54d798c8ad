//! Error taxonomy for the storage layer.
//!
//! Nothing in this crate retries. Every failure is returned to the caller
//! with enough context to say which entity and which path were involved.

use std::io;
use std::path::{Path, PathBuf};

use quire_types::Kind;
use thiserror::Error;

/// Remote operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Pull,
    Push,
}

impl std::fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteOp::Pull => f.write_str("pull"),
            RemoteOp::Push => f.write_str("push"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Update or Delete for an ID this backend never loaded or created.
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: Kind, id: String },

    /// Create was called before the caller assigned an ID.
    #[error("{kind} {name:?} has no ID")]
    MissingId { kind: Kind, name: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The identity cache names a file that is no longer on disk.
    #[error("cannot rename {}: source does not exist", path.display())]
    RenameSourceMissing { path: PathBuf },

    /// A configured remote could not be reached or rejected the operation.
    #[error("failed to {op} changes: {message}")]
    Remote { op: RemoteOp, message: String },

    /// Local repository failure (staging, committing, reading history).
    #[error("git {context}: {source}")]
    Git {
        context: String,
        #[source]
        source: git2::Error,
    },

    /// Malformed document encountered while loading.
    #[error("failed to decode {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn git(context: impl Into<String>, source: git2::Error) -> Self {
        StoreError::Git {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn remote(op: RemoteOp, message: impl Into<String>) -> Self {
        StoreError::Remote {
            op,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Attach a path-bearing context to `io::Result`s.
pub(crate) trait IoContext<T> {
    fn at(self, action: &str, path: &Path) -> StoreResult<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, action: &str, path: &Path) -> StoreResult<T> {
        self.map_err(|source| StoreError::io(format!("failed to {action} {}", path.display()), source))
    }
}
