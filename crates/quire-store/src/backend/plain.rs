//! Plain filesystem backend: entities on disk, nothing else.

use std::path::PathBuf;

use quire_types::{Collection, Entity, EntityMut, EntityRef, Kind, Preferences};

use crate::error::StoreResult;
use crate::repository::Repository;
use crate::store::{EntityStore, RenamePolicy};

#[derive(Debug)]
pub struct FsRepository {
    store: EntityStore,
    workspace: String,
}

impl FsRepository {
    pub fn new(data_dir: impl Into<PathBuf>, workspace: impl Into<String>) -> Self {
        Self {
            store: EntityStore::new(data_dir, RenamePolicy::Direct),
            workspace: workspace.into(),
        }
    }
}

impl Repository for FsRepository {
    fn active_workspace(&self) -> &str {
        &self.workspace
    }

    fn set_active_workspace(&mut self, name: &str) {
        self.workspace = name.to_string();
    }

    fn load(&mut self, kind: Kind) -> StoreResult<Vec<Entity>> {
        self.store.load(kind, &self.workspace)
    }

    fn create(&mut self, mut entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        self.store.create(&self.workspace, &mut entity, collection)
    }

    fn update(&mut self, mut entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        self.store.update(&self.workspace, &mut entity, collection)
    }

    fn delete(&mut self, entity: EntityRef<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        self.store
            .delete(&self.workspace, entity, collection)
            .map(|_removed| ())
    }

    fn load_preferences(&mut self) -> StoreResult<Preferences> {
        self.store.load_preferences()
    }

    fn update_preferences(&mut self, preferences: &Preferences) -> StoreResult<()> {
        self.store.update_preferences(preferences)
    }
}
