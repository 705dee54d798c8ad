//! Filesystem mechanics shared by both backends.
//!
//! [`EntityStore`] turns load/create/update/delete of any entity kind into
//! directory listings, file writes, renames and removals under the data root,
//! and keeps the [`IdentityCache`] in step with what it did on disk. It knows
//! nothing about version control; the git backend wraps it.

use std::path::{Path, PathBuf};

use quire_types::{Collection, EXTENSION, Entity, EntityMut, EntityRef, Kind, Preferences};
use tracing::{debug, warn};

use crate::cache::IdentityCache;
use crate::error::{IoContext, StoreError, StoreResult};
use crate::fs::LocalFs;
use crate::layout::Layout;
use crate::naming::{
    ensure_unique_name, entity_path, metadata_path, occupied_by_other, rename_entity,
};

/// What to do when a renamed entity's new name is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenamePolicy {
    /// Rename straight onto the target.
    Direct,
    /// If the target belongs to a different entity, pick a suffixed name
    /// first. Used where a pull may have introduced the target.
    GuardCollisions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// New entity: take the first free name.
    Unique,
    /// Existing entity: write in place.
    Overwrite,
}

#[derive(Debug)]
pub struct EntityStore {
    layout: Layout,
    cache: IdentityCache,
    policy: RenamePolicy,
}

impl EntityStore {
    pub fn new(data_dir: impl Into<PathBuf>, policy: RenamePolicy) -> Self {
        Self {
            layout: Layout::new(LocalFs::new(data_dir)),
            cache: IdentityCache::new(),
            policy,
        }
    }

    pub fn fs(&self) -> &LocalFs {
        self.layout.fs()
    }

    pub fn data_dir(&self) -> &Path {
        self.fs().root()
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Load every entity of `kind` in `workspace`.
    ///
    /// Composite kinds only count directories holding their metadata file.
    /// A document that fails to decode aborts the whole load.
    pub fn load(&mut self, kind: Kind, workspace: &str) -> StoreResult<Vec<Entity>> {
        let dir = self.parent_dir(kind, workspace, None)?;
        let entities = if kind.is_composite() {
            self.load_composites(kind, &dir)?
        } else {
            self.load_leaves(kind, &dir)?
        };
        debug!(%kind, workspace, count = entities.len(), "loaded");
        Ok(entities)
    }

    /// Persist a new entity, suffixing its name if the name is taken.
    ///
    /// The final name is written back into `entity`.
    pub fn create(
        &mut self,
        workspace: &str,
        entity: &mut EntityMut<'_>,
        collection: Option<&Collection>,
    ) -> StoreResult<()> {
        if entity.id().is_empty() {
            return Err(StoreError::MissingId {
                kind: entity.kind(),
                name: entity.name().to_string(),
            });
        }

        self.write(workspace, entity, collection, WriteMode::Unique)?;
        self.cache.record(entity.id(), entity.name());
        Ok(())
    }

    /// Persist changes to a known entity, renaming its file or directory
    /// first if its name changed since it was last loaded or written.
    pub fn update(
        &mut self,
        workspace: &str,
        entity: &mut EntityMut<'_>,
        collection: Option<&Collection>,
    ) -> StoreResult<()> {
        let kind = entity.kind();
        let old_name = self
            .cache
            .name_of(entity.id())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: entity.id().to_string(),
            })?
            .to_string();

        if old_name != entity.name() {
            let dir = self.parent_dir(kind, workspace, collection)?;

            if self.policy == RenamePolicy::GuardCollisions
                && occupied_by_other(self.fs(), &dir, entity.name(), kind, entity.id())?
            {
                let unique = ensure_unique_name(self.fs(), &dir, entity.name(), kind);
                debug!(%kind, wanted = entity.name(), using = %unique, "rename target taken by another entity");
                entity.set_name(unique);
            }

            rename_entity(self.fs(), &dir, &old_name, entity.name(), kind)?;
            self.cache.record(entity.id(), entity.name());
        }

        self.write(workspace, entity, collection, WriteMode::Overwrite)
    }

    /// Remove a known entity. Composite kinds are removed recursively, and
    /// requests attached to an in-memory collection leave the cache with it.
    ///
    /// Returns the name that was removed from disk, which is the cached name
    /// rather than whatever `entity` is called in memory.
    pub fn delete(
        &mut self,
        workspace: &str,
        entity: EntityRef<'_>,
        collection: Option<&Collection>,
    ) -> StoreResult<String> {
        let kind = entity.kind();
        let name = self
            .cache
            .name_of(entity.id())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: entity.id().to_string(),
            })?
            .to_string();

        let dir = self.parent_dir(kind, workspace, collection)?;
        let path = entity_path(&dir, &name, kind);

        debug!(%kind, path = %path.display(), "removing");
        if kind.is_composite() {
            self.fs().remove_all(&path).at("remove", &path)?;
        } else {
            self.fs().remove(&path).at("remove", &path)?;
        }

        self.cache.forget(entity.id());
        for nested in entity.nested_ids() {
            self.cache.forget(nested);
        }
        Ok(name)
    }

    /// Read preferences, or defaults when none were saved yet.
    pub fn load_preferences(&self) -> StoreResult<Preferences> {
        let path = self.layout.preferences_path();
        if !self.fs().exists(&path) {
            return Ok(Preferences::default());
        }

        let bytes = self.fs().read(&path).at("read", &path)?;
        serde_yaml_ng::from_slice(&bytes).map_err(|source| StoreError::Serialization { path, source })
    }

    pub fn update_preferences(&self, preferences: &Preferences) -> StoreResult<()> {
        let text = serde_yaml_ng::to_string(preferences).map_err(|source| StoreError::Encode {
            what: "preferences".to_string(),
            source,
        })?;

        let root = self.data_dir();
        self.fs().mkdir(Path::new("")).at("create directory", root)?;

        let path = self.layout.preferences_path();
        debug!(path = %path.display(), "writing preferences");
        self.fs().write(&path, text.as_bytes()).at("write", &path)
    }

    fn parent_dir(
        &self,
        kind: Kind,
        workspace: &str,
        collection: Option<&Collection>,
    ) -> StoreResult<PathBuf> {
        match kind {
            Kind::Request => self.layout.request_dir(workspace, collection),
            _ => self.layout.entity_dir(kind, workspace),
        }
    }

    fn write(
        &self,
        workspace: &str,
        entity: &mut EntityMut<'_>,
        collection: Option<&Collection>,
        mode: WriteMode,
    ) -> StoreResult<()> {
        let kind = entity.kind();
        let dir = self.parent_dir(kind, workspace, collection)?;

        if mode == WriteMode::Unique {
            let unique = ensure_unique_name(self.fs(), &dir, entity.name(), kind);
            if unique != entity.name() {
                entity.set_name(unique);
            }
        }

        let bytes = entity.to_yaml().map_err(|source| StoreError::Encode {
            what: format!("{kind} {:?}", entity.name()),
            source,
        })?;

        if kind.is_composite() {
            let entity_dir = entity_path(&dir, entity.name(), kind);
            if !self.fs().exists(&entity_dir) {
                self.fs()
                    .create_dir(&entity_dir)
                    .at("create directory", &entity_dir)?;
            }
        }

        let path = metadata_path(&dir, entity.name(), kind);
        debug!(%kind, path = %path.display(), ?mode, "writing");
        self.fs().write(&path, &bytes).at("write", &path)
    }

    fn load_composites(&mut self, kind: Kind, dir: &Path) -> StoreResult<Vec<Entity>> {
        let entries = self.fs().list(dir).at("list", dir)?;
        let mut out = Vec::new();

        for entry in entries {
            if !entry.is_dir() || entry.is_hidden() {
                continue;
            }

            let doc = metadata_path(dir, &entry.name, kind);
            if !self.fs().exists(&doc) {
                warn!(%kind, dir = %dir.join(&entry.name).display(), "skipping directory without metadata file");
                continue;
            }

            let mut entity = self.read_document(kind, &doc)?;
            if let Entity::Collection(collection) = &mut entity {
                collection.requests = self.load_collection_requests(&dir.join(&entry.name))?;
            }

            self.cache.record(entity.id(), entity.name());
            out.push(entity);
        }

        Ok(out)
    }

    fn load_leaves(&mut self, kind: Kind, dir: &Path) -> StoreResult<Vec<Entity>> {
        let entries = self.fs().list(dir).at("list", dir)?;
        let mut out = Vec::new();

        for entry in entries {
            if entry.stem_with_extension(EXTENSION).is_none() {
                continue;
            }

            let entity = self.read_document(kind, &dir.join(&entry.name))?;
            self.cache.record(entity.id(), entity.name());
            out.push(entity);
        }

        Ok(out)
    }

    /// Requests stored beside a collection's metadata file, with defaults filled.
    fn load_collection_requests(&mut self, dir: &Path) -> StoreResult<Vec<quire_types::Request>> {
        let metadata_file = Kind::Collection.metadata_file();
        let entries = self.fs().list(dir).at("list", dir)?;
        let mut out = Vec::new();

        for entry in entries {
            if entry.stem_with_extension(EXTENSION).is_none()
                || Some(&entry.name) == metadata_file.as_ref()
            {
                continue;
            }

            let path = dir.join(&entry.name);
            let Some(mut request) = self.read_document(Kind::Request, &path)?.into_request() else {
                continue;
            };
            request.set_default_values();
            self.cache.record(&request.metadata.id, &request.metadata.name);
            out.push(request);
        }

        Ok(out)
    }

    fn read_document(&self, kind: Kind, path: &Path) -> StoreResult<Entity> {
        let bytes = self.fs().read(path).at("read", path)?;
        Entity::from_yaml(kind, &bytes).map_err(|source| StoreError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }
}
