//! Stored documents other than requests.
//!
//! Every document shares the same outer shape:
//!
//! ```yaml
//! apiVersion: v1
//! kind: Environment
//! metadata:
//!   id: 3b1f...
//!   name: staging
//! spec: { ... }
//! ```

use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::request::Request;

/// Document format version written by this crate.
pub const API_VERSION: &str = "v1";

pub(crate) fn api_version() -> String {
    API_VERSION.to_string()
}

/// Identity and display name of a stored entity.
///
/// `id` is assigned once, upstream of the storage layer, and never changes.
/// `name` is used verbatim as the file or directory name on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub id: String,
    pub name: String,
}

impl Meta {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A toggleable key/value pair (environment values, headers, params).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub enable: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            key: key.into(),
            value: value.into(),
            enable: true,
        }
    }
}

/// Only the `metadata` of a document. Decoding ignores everything else.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentHeader {
    pub metadata: Meta,
}

/// Root-level container: a directory under the data root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default = "api_version")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: Meta,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::Workspace,
            metadata: Meta::new(id, name),
        }
    }
}

/// A directory of requests with a `_collection.yaml` metadata file.
///
/// `requests` is never serialized into the metadata file: each request is a
/// sibling file in the collection directory and is attached on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default = "api_version")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: Meta,
    #[serde(skip)]
    pub requests: Vec<Request>,
}

impl Collection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::Collection,
            metadata: Meta::new(id, name),
            requests: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

/// A named set of variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default = "api_version")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: Meta,
    #[serde(default)]
    pub spec: EnvironmentSpec,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::Environment,
            metadata: Meta::new(id, name),
            spec: EnvironmentSpec::default(),
        }
    }

    /// Set a value, replacing an existing entry with the same key.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.spec.values.iter_mut().find(|kv| kv.key == key) {
            Some(kv) => kv.value = value,
            None => self.spec.values.push(KeyValue::new(key, value)),
        }
    }

    /// Value of an enabled key.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.spec
            .values
            .iter()
            .find(|kv| kv.enable && kv.key == key)
            .map(|kv| kv.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoFileSpec {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_import_path: bool,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// A registered `.proto` file or import path used by gRPC requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoFile {
    #[serde(default = "api_version")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: Meta,
    #[serde(default)]
    pub spec: ProtoFileSpec,
}

impl ProtoFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::ProtoFile,
            metadata: Meta::new(id, name),
            spec: ProtoFileSpec::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesSpec {
    #[serde(default = "dark_mode_default")]
    pub dark_mode: bool,
    #[serde(default)]
    pub selected_environment_id: String,
}

fn dark_mode_default() -> bool {
    true
}

impl Default for PreferencesSpec {
    fn default() -> Self {
        Self {
            dark_mode: dark_mode_default(),
            selected_environment_id: String::new(),
        }
    }
}

/// Application preferences stored next to the workspaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "api_version")]
    pub api_version: String,
    #[serde(default)]
    pub spec: PreferencesSpec,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_version: api_version(),
            spec: PreferencesSpec::default(),
        }
    }
}
