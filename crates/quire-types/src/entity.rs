//! The sum types the storage layer dispatches on.
//!
//! - [`Entity`] owns a payload (returned by loads)
//! - [`EntityMut`] borrows one mutably (create/update may rewrite the name)
//! - [`EntityRef`] borrows one immutably (delete)

use crate::document::{Collection, Environment, Meta, ProtoFile, Workspace};
use crate::kind::Kind;
use crate::request::Request;

/// Expand `$body` once per variant with `$inner` bound to the payload.
macro_rules! each_variant {
    ($value:expr, $enum:ident, $inner:ident => $body:expr) => {
        match $value {
            $enum::Workspace($inner) => $body,
            $enum::Collection($inner) => $body,
            $enum::Environment($inner) => $body,
            $enum::Request($inner) => $body,
            $enum::ProtoFile($inner) => $body,
        }
    };
}

/// An owned stored object of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Workspace(Workspace),
    Collection(Collection),
    Environment(Environment),
    Request(Request),
    ProtoFile(ProtoFile),
}

impl Entity {
    pub fn kind(&self) -> Kind {
        match self {
            Entity::Workspace(_) => Kind::Workspace,
            Entity::Collection(_) => Kind::Collection,
            Entity::Environment(_) => Kind::Environment,
            Entity::Request(_) => Kind::Request,
            Entity::ProtoFile(_) => Kind::ProtoFile,
        }
    }

    pub fn meta(&self) -> &Meta {
        each_variant!(self, Entity, e => &e.metadata)
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn view_mut(&mut self) -> EntityMut<'_> {
        each_variant!(self, Entity, e => e.into())
    }

    /// Decode a document of the given kind.
    pub fn from_yaml(kind: Kind, bytes: &[u8]) -> Result<Entity, serde_yaml_ng::Error> {
        Ok(match kind {
            Kind::Workspace => Entity::Workspace(serde_yaml_ng::from_slice(bytes)?),
            Kind::Collection => Entity::Collection(serde_yaml_ng::from_slice(bytes)?),
            Kind::Environment => Entity::Environment(serde_yaml_ng::from_slice(bytes)?),
            Kind::Request => Entity::Request(serde_yaml_ng::from_slice(bytes)?),
            Kind::ProtoFile => Entity::ProtoFile(serde_yaml_ng::from_slice(bytes)?),
        })
    }

    pub fn into_workspace(self) -> Option<Workspace> {
        match self {
            Entity::Workspace(w) => Some(w),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Entity::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_environment(self) -> Option<Environment> {
        match self {
            Entity::Environment(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_request(self) -> Option<Request> {
        match self {
            Entity::Request(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_proto_file(self) -> Option<ProtoFile> {
        match self {
            Entity::ProtoFile(p) => Some(p),
            _ => None,
        }
    }
}

/// A mutable borrow of a stored object.
#[derive(Debug)]
pub enum EntityMut<'a> {
    Workspace(&'a mut Workspace),
    Collection(&'a mut Collection),
    Environment(&'a mut Environment),
    Request(&'a mut Request),
    ProtoFile(&'a mut ProtoFile),
}

impl EntityMut<'_> {
    pub fn kind(&self) -> Kind {
        self.view().kind()
    }

    pub fn meta(&self) -> &Meta {
        each_variant!(self, EntityMut, e => &e.metadata)
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Rewrite the name, e.g. after a uniqueness suffix was applied.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        each_variant!(self, EntityMut, e => e.metadata.name = name)
    }

    pub fn view(&self) -> EntityRef<'_> {
        each_variant!(self, EntityMut, e => EntityRef::from(&**e))
    }

    /// Encode the document. Collections encode metadata only.
    pub fn to_yaml(&self) -> Result<Vec<u8>, serde_yaml_ng::Error> {
        let text = each_variant!(self, EntityMut, e => serde_yaml_ng::to_string(&**e)?);
        Ok(text.into_bytes())
    }
}

/// A shared borrow of a stored object.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Workspace(&'a Workspace),
    Collection(&'a Collection),
    Environment(&'a Environment),
    Request(&'a Request),
    ProtoFile(&'a ProtoFile),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            EntityRef::Workspace(_) => Kind::Workspace,
            EntityRef::Collection(_) => Kind::Collection,
            EntityRef::Environment(_) => Kind::Environment,
            EntityRef::Request(_) => Kind::Request,
            EntityRef::ProtoFile(_) => Kind::ProtoFile,
        }
    }

    pub fn meta(&self) -> &'a Meta {
        each_variant!(*self, EntityRef, e => &e.metadata)
    }

    pub fn id(&self) -> &'a str {
        &self.meta().id
    }

    pub fn name(&self) -> &'a str {
        &self.meta().name
    }

    /// IDs of entities stored inside this one that the in-memory value knows about.
    pub fn nested_ids(&self) -> Vec<&'a str> {
        match *self {
            EntityRef::Collection(c) => c.requests.iter().map(|r| r.metadata.id.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Entity::$variant(value)
                }
            }

            impl<'a> From<&'a mut $variant> for EntityMut<'a> {
                fn from(value: &'a mut $variant) -> Self {
                    EntityMut::$variant(value)
                }
            }

            impl<'a> From<&'a $variant> for EntityRef<'a> {
                fn from(value: &'a $variant) -> Self {
                    EntityRef::$variant(value)
                }
            }
        )*
    };
}

impl_from_payload!(Workspace, Collection, Environment, Request, ProtoFile);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_name_rewrites_payload() {
        let mut env = Environment::new("e1", "staging");
        EntityMut::from(&mut env).set_name("staging_1");
        assert_eq!(env.metadata.name, "staging_1");
    }

    #[test]
    fn collection_yaml_omits_requests() {
        let mut col = Collection::new("c1", "Orders");
        col.requests.push(Request::new_http("r1", "List"));

        let bytes = EntityMut::from(&mut col).to_yaml().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("name: Orders"));
        assert!(!text.contains("List"));
    }

    #[test]
    fn decodes_by_kind() {
        let mut proto = ProtoFile::new("p1", "greeter.proto");
        proto.spec.services = vec!["helloworld.Greeter".to_string()];
        let bytes = EntityMut::from(&mut proto).to_yaml().unwrap();

        let decoded = Entity::from_yaml(Kind::ProtoFile, &bytes).unwrap();

        assert_eq!(decoded, Entity::ProtoFile(proto));
    }

    #[test]
    fn nested_ids_come_from_collection_requests() {
        let mut col = Collection::new("c1", "Orders");
        col.requests.push(Request::new_http("r1", "List"));
        col.requests.push(Request::new_http("r2", "Get"));

        assert_eq!(EntityRef::from(&col).nested_ids(), vec!["r1", "r2"]);
        let env = Environment::new("e1", "dev");
        assert!(EntityRef::from(&env).nested_ids().is_empty());
    }
}
