//! quire-types: pure data types for quire.
//!
//! This crate defines the entity model shared by every storage backend:
//!
//! - **Kinds**: the type tag that routes an entity to its directory
//! - **Documents**: the YAML payloads for workspaces, collections,
//!   environments, requests and proto files
//! - **Entity sum types**: owned and borrowed views dispatched by `match`
//!
//! It performs no I/O.

pub mod document;
pub mod entity;
pub mod kind;
pub mod request;

pub use document::{
    API_VERSION, Collection, DocumentHeader, Environment, EnvironmentSpec, KeyValue, Meta,
    Preferences, PreferencesSpec, ProtoFile, ProtoFileSpec, Workspace,
};
pub use entity::{Entity, EntityMut, EntityRef};
pub use kind::{EXTENSION, Kind, UnknownKind};
pub use request::{
    Auth, Body, GrpcRequestSpec, GrpcSettings, HttpRequest, HttpRequestSpec, Request,
    RequestSpec, RequestType, Script, ServerInfo,
};
