//! Entity kinds and the storage capabilities attached to each.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extension shared by every stored document.
pub const EXTENSION: &str = "yaml";

/// The type tag of a stored entity.
///
/// The kind selects the directory an entity lives in and whether it is stored
/// as a directory (composite) or as a single leaf file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Workspace,
    Collection,
    Environment,
    Request,
    ProtoFile,
}

impl Kind {
    /// True for kinds stored as a directory holding a metadata file.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Workspace | Kind::Collection)
    }

    /// Name of the per-workspace directory holding this kind.
    ///
    /// Workspaces have none: they are direct children of the data root.
    pub fn dir_name(self) -> Option<&'static str> {
        match self {
            Kind::Workspace => None,
            Kind::Collection => Some("collections"),
            Kind::Environment => Some("environments"),
            Kind::Request => Some("requests"),
            Kind::ProtoFile => Some("protofiles"),
        }
    }

    /// File stem of the metadata document inside a composite directory.
    pub fn metadata_stem(self) -> Option<&'static str> {
        match self {
            Kind::Workspace => Some("_workspace"),
            Kind::Collection => Some("_collection"),
            _ => None,
        }
    }

    /// Metadata file name (`_collection.yaml`), composites only.
    pub fn metadata_file(self) -> Option<String> {
        self.metadata_stem().map(|stem| format!("{stem}.{EXTENSION}"))
    }

    /// Lower-case label used in commit messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Kind::Workspace => "workspace",
            Kind::Collection => "collection",
            Kind::Environment => "environment",
            Kind::Request => "request",
            Kind::ProtoFile => "proto file",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Workspace => "Workspace",
            Kind::Collection => "Collection",
            Kind::Environment => "Environment",
            Kind::Request => "Request",
            Kind::ProtoFile => "ProtoFile",
        };
        f.write_str(s)
    }
}

/// Returned when a string does not name a [`Kind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    /// Accepts the type name or the directory name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workspace" | "workspaces" => Ok(Kind::Workspace),
            "collection" | "collections" => Ok(Kind::Collection),
            "environment" | "environments" | "env" | "envs" => Ok(Kind::Environment),
            "request" | "requests" => Ok(Kind::Request),
            "protofile" | "protofiles" | "proto" => Ok(Kind::ProtoFile),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}
