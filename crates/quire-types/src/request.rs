//! Request documents (HTTP and gRPC).
//!
//! The storage layer only marshals these; nothing here executes a request.

use serde::{Deserialize, Serialize};

use crate::document::{KeyValue, Meta, api_version};
use crate::kind::Kind;

pub const DEFAULT_HTTP_METHOD: &str = "GET";
pub const DEFAULT_GRPC_ADDRESS: &str = "localhost:8090";
/// Placeholder used for body, auth and script types that were never set.
pub const NONE_TYPE: &str = "none";

/// Which protocol a request speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Http,
    Grpc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(rename = "type", default)]
    pub body_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(rename = "type", default)]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Pre- or post-request hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "type", default)]
    pub script_type: String,
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub path_params: Vec<KeyValue>,
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    #[serde(default)]
    pub body: Body,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub pre_request: Script,
    #[serde(default)]
    pub post_request: Script,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestSpec {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_used_environment: String,
    #[serde(default)]
    pub request: HttpRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub server_reflection: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcSettings {
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub timeout_milliseconds: u64,
    #[serde(default)]
    pub name_override: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRequestSpec {
    #[serde(default)]
    pub last_selected_method: String,
    #[serde(default)]
    pub metadata: Vec<KeyValue>,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub server_info: ServerInfo,
    #[serde(default)]
    pub settings: GrpcSettings,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Older documents may lack this; see [`Request::infer_type`].
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRequestSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<GrpcRequestSpec>,
}

/// A saved request, standalone or inside a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default = "api_version")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: Meta,
    #[serde(default)]
    pub spec: RequestSpec,
}

impl Request {
    pub fn new_http(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::Request,
            metadata: Meta::new(id, name),
            spec: RequestSpec {
                request_type: Some(RequestType::Http),
                http: Some(HttpRequestSpec {
                    method: DEFAULT_HTTP_METHOD.to_string(),
                    ..Default::default()
                }),
                grpc: None,
            },
        }
    }

    pub fn new_grpc(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version(),
            kind: Kind::Request,
            metadata: Meta::new(id, name),
            spec: RequestSpec {
                request_type: Some(RequestType::Grpc),
                http: None,
                grpc: Some(GrpcRequestSpec {
                    server_info: ServerInfo {
                        address: DEFAULT_GRPC_ADDRESS.to_string(),
                        server_reflection: false,
                    },
                    ..Default::default()
                }),
            },
        }
    }

    /// The protocol implied by which spec section is present.
    ///
    /// gRPC wins if a document somehow carries both.
    pub fn infer_type(&self) -> Option<RequestType> {
        if self.spec.grpc.is_some() {
            Some(RequestType::Grpc)
        } else if self.spec.http.is_some() {
            Some(RequestType::Http)
        } else {
            None
        }
    }

    /// Fill in fields that older documents leave empty.
    pub fn set_default_values(&mut self) {
        if let Some(http) = self.spec.http.as_mut() {
            if http.method.is_empty() {
                http.method = DEFAULT_HTTP_METHOD.to_string();
            }
            let req = &mut http.request;
            for ty in [
                &mut req.body.body_type,
                &mut req.auth.auth_type,
                &mut req.pre_request.script_type,
                &mut req.post_request.script_type,
            ] {
                if ty.is_empty() {
                    *ty = NONE_TYPE.to_string();
                }
            }
        }

        if let Some(grpc) = self.spec.grpc.as_mut() {
            if grpc.server_info.address.is_empty() {
                grpc.server_info.address = DEFAULT_GRPC_ADDRESS.to_string();
            }
            if grpc.auth.auth_type.is_empty() {
                grpc.auth.auth_type = NONE_TYPE.to_string();
            }
        }

        if self.spec.request_type.is_none() {
            self.spec.request_type = self.infer_type();
        }
    }
}
