//! The storage contract the rest of the application depends on.

use quire_types::{
    Collection, Entity, EntityMut, EntityRef, Environment, Kind, Preferences, ProtoFile, Request,
    Workspace,
};

use crate::backend::{FsRepository, GitRepository};
use crate::config::{BackendKind, StoreConfig};
use crate::error::StoreResult;

/// Load/create/update/delete for every entity kind, scoped to the active
/// workspace.
///
/// Create and Update may rewrite the entity's name (uniqueness suffix), so
/// they take it mutably. Requests carry the collection they belong to, or
/// `None` for standalone requests.
///
/// Implementations are not internally synchronized; share one across threads
/// only behind a mutex.
pub trait Repository {
    fn active_workspace(&self) -> &str;

    fn set_active_workspace(&mut self, name: &str);

    fn load(&mut self, kind: Kind) -> StoreResult<Vec<Entity>>;

    fn create(&mut self, entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()>;

    fn update(&mut self, entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()>;

    fn delete(&mut self, entity: EntityRef<'_>, collection: Option<&Collection>) -> StoreResult<()>;

    fn load_preferences(&mut self) -> StoreResult<Preferences>;

    fn update_preferences(&mut self, preferences: &Preferences) -> StoreResult<()>;

    /// Remote sync and history, for backends that keep them.
    fn version_control(&mut self) -> Option<&mut dyn VersionControl> {
        None
    }

    fn load_workspaces(&mut self) -> StoreResult<Vec<Workspace>> {
        Ok(self
            .load(Kind::Workspace)?
            .into_iter()
            .filter_map(Entity::into_workspace)
            .collect())
    }

    fn create_workspace(&mut self, workspace: &mut Workspace) -> StoreResult<()> {
        self.create(workspace.into(), None)
    }

    fn update_workspace(&mut self, workspace: &mut Workspace) -> StoreResult<()> {
        self.update(workspace.into(), None)
    }

    fn delete_workspace(&mut self, workspace: &Workspace) -> StoreResult<()> {
        self.delete(workspace.into(), None)
    }

    /// Collections come back with their requests attached.
    fn load_collections(&mut self) -> StoreResult<Vec<Collection>> {
        Ok(self
            .load(Kind::Collection)?
            .into_iter()
            .filter_map(Entity::into_collection)
            .collect())
    }

    fn create_collection(&mut self, collection: &mut Collection) -> StoreResult<()> {
        self.create(collection.into(), None)
    }

    fn update_collection(&mut self, collection: &mut Collection) -> StoreResult<()> {
        self.update(collection.into(), None)
    }

    /// Removes the collection directory with every request in it.
    fn delete_collection(&mut self, collection: &Collection) -> StoreResult<()> {
        self.delete(collection.into(), None)
    }

    fn load_environments(&mut self) -> StoreResult<Vec<Environment>> {
        Ok(self
            .load(Kind::Environment)?
            .into_iter()
            .filter_map(Entity::into_environment)
            .collect())
    }

    fn create_environment(&mut self, environment: &mut Environment) -> StoreResult<()> {
        self.create(environment.into(), None)
    }

    fn update_environment(&mut self, environment: &mut Environment) -> StoreResult<()> {
        self.update(environment.into(), None)
    }

    fn delete_environment(&mut self, environment: &Environment) -> StoreResult<()> {
        self.delete(environment.into(), None)
    }

    /// Standalone requests only; collection requests load with their collection.
    fn load_requests(&mut self) -> StoreResult<Vec<Request>> {
        Ok(self
            .load(Kind::Request)?
            .into_iter()
            .filter_map(Entity::into_request)
            .collect())
    }

    fn create_request(
        &mut self,
        request: &mut Request,
        collection: Option<&Collection>,
    ) -> StoreResult<()> {
        self.create(request.into(), collection)
    }

    fn update_request(
        &mut self,
        request: &mut Request,
        collection: Option<&Collection>,
    ) -> StoreResult<()> {
        self.update(request.into(), collection)
    }

    fn delete_request(&mut self, request: &Request, collection: Option<&Collection>) -> StoreResult<()> {
        self.delete(request.into(), collection)
    }

    fn load_proto_files(&mut self) -> StoreResult<Vec<ProtoFile>> {
        Ok(self
            .load(Kind::ProtoFile)?
            .into_iter()
            .filter_map(Entity::into_proto_file)
            .collect())
    }

    fn create_proto_file(&mut self, proto_file: &mut ProtoFile) -> StoreResult<()> {
        self.create(proto_file.into(), None)
    }

    fn update_proto_file(&mut self, proto_file: &mut ProtoFile) -> StoreResult<()> {
        self.update(proto_file.into(), None)
    }

    fn delete_proto_file(&mut self, proto_file: &ProtoFile) -> StoreResult<()> {
        self.delete(proto_file.into(), None)
    }
}

/// One entry of the commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// First seven hex digits of the commit id.
    pub short_hash: String,
    pub message: String,
}

/// Explicit remote sync and history.
pub trait VersionControl {
    /// Fetch and fast-forward. A no-op without a configured remote.
    fn pull(&mut self) -> StoreResult<()>;

    /// Publish local commits. A no-op without a configured remote.
    fn push(&mut self) -> StoreResult<()>;

    /// Commits reachable from HEAD, newest first.
    fn commit_history(&self) -> StoreResult<Vec<CommitSummary>>;
}

/// Open the backend selected by `config` for its workspace.
pub fn open_repository(config: &StoreConfig) -> StoreResult<Box<dyn Repository>> {
    Ok(match config.backend {
        BackendKind::Filesystem => Box::new(FsRepository::new(&config.data_dir, &config.workspace)),
        BackendKind::Git => Box::new(GitRepository::open(
            &config.data_dir,
            &config.workspace,
            config.git.clone(),
        )?),
    })
}
