//! The two [`Repository`](crate::Repository) implementations.

mod git;
mod plain;

pub use git::GitRepository;
pub use plain::FsRepository;
