//! quire-store: durable storage for quire entities.
//!
//! Workspaces, collections, environments, requests and proto files are kept
//! as YAML documents under a data root:
//!
//! - **[`FsRepository`]**: plain files and directories
//! - **[`GitRepository`]**: the same layout inside a git working tree, with a
//!   commit per mutation, a pull before every load and an explicit push
//!
//! Both implement [`Repository`]. Names are used verbatim as file and
//! directory names and are made unique with `_1`, `_2`, ... suffixes. Each
//! backend keeps an [`IdentityCache`] of ID → name so a changed name turns
//! into a rename on the next update.
//!
//! Everything here is blocking and unsynchronized.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod layout;
pub mod naming;
pub mod paths;
pub mod repository;
pub mod store;

pub use backend::{FsRepository, GitRepository};
pub use cache::IdentityCache;
pub use config::{BackendKind, GitConfig, StoreConfig};
pub use error::{RemoteOp, StoreError, StoreResult};
pub use layout::Layout;
pub use repository::{CommitSummary, Repository, VersionControl, open_repository};
pub use store::{EntityStore, RenamePolicy};
