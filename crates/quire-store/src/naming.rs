//! Name uniqueness and renames.
//!
//! Entity names become file or directory names verbatim. Leaf kinds are
//! stored as `<name>.yaml`, composite kinds as a `<name>/` directory.

use std::path::{Path, PathBuf};

use quire_types::{DocumentHeader, EXTENSION, Kind};
use tracing::debug;

use crate::error::{IoContext, StoreError, StoreResult};
use crate::fs::LocalFs;

/// Path of the file or directory backing an entity named `name` in `dir`.
pub fn entity_path(dir: &Path, name: &str, kind: Kind) -> PathBuf {
    if kind.is_composite() {
        dir.join(name)
    } else {
        dir.join(format!("{name}.{EXTENSION}"))
    }
}

/// Path of the document itself: the metadata file inside a composite
/// directory, or the leaf file.
pub fn metadata_path(dir: &Path, name: &str, kind: Kind) -> PathBuf {
    match kind.metadata_file() {
        Some(file) => dir.join(name).join(file),
        None => entity_path(dir, name, kind),
    }
}

/// First free name among `base`, `base_1`, `base_2`, ...
///
/// Check-then-act: two writers racing on the same base name can both get it.
pub fn ensure_unique_name(fs: &LocalFs, dir: &Path, base: &str, kind: Kind) -> String {
    if !fs.exists(&entity_path(dir, base, kind)) {
        return base.to_string();
    }

    let mut n = 1u64;
    loop {
        let candidate = format!("{base}_{n}");
        if !fs.exists(&entity_path(dir, &candidate, kind)) {
            debug!(base, candidate, "name taken, using suffix");
            return candidate;
        }
        n += 1;
    }
}

/// Rename the backing file or directory from `old` to `new`.
///
/// A missing source means the identity cache disagrees with the disk and is
/// reported as [`StoreError::RenameSourceMissing`].
pub fn rename_entity(fs: &LocalFs, dir: &Path, old: &str, new: &str, kind: Kind) -> StoreResult<()> {
    let from = entity_path(dir, old, kind);
    let to = entity_path(dir, new, kind);

    if !fs.exists(&from) {
        return Err(StoreError::RenameSourceMissing { path: from });
    }

    debug!(from = %from.display(), to = %to.display(), "renaming");
    fs.rename(&from, &to).at("rename", &from)
}

/// Whether `name` in `dir` is held by an entity other than `id`.
///
/// A composite directory without its metadata file, or a document that does
/// not decode, counts as occupied: it is not ours to overwrite.
pub fn occupied_by_other(
    fs: &LocalFs,
    dir: &Path,
    name: &str,
    kind: Kind,
    id: &str,
) -> StoreResult<bool> {
    if !fs.exists(&entity_path(dir, name, kind)) {
        return Ok(false);
    }

    let doc = metadata_path(dir, name, kind);
    if !fs.exists(&doc) {
        return Ok(true);
    }

    let bytes = fs.read(&doc).at("read", &doc)?;
    match serde_yaml_ng::from_slice::<DocumentHeader>(&bytes) {
        Ok(header) => Ok(header.metadata.id != id),
        Err(err) => {
            debug!(path = %doc.display(), error = %err, "undecodable document treated as occupied");
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn setup() -> (LocalFs, TempDir) {
        let dir = TempDir::new().unwrap();
        (LocalFs::new(dir.path()), dir)
    }

    fn doc(id: &str, name: &str) -> String {
        format!("apiVersion: v1\nkind: Environment\nmetadata:\n  id: {id}\n  name: {name}\n")
    }

    #[rstest]
    #[case(Kind::Environment, "envs/dev.yaml")]
    #[case(Kind::Collection, "envs/dev")]
    fn entity_path_by_kind(#[case] kind: Kind, #[case] expected: &str) {
        assert_eq!(entity_path(Path::new("envs"), "dev", kind), PathBuf::from(expected));
    }

    #[test]
    fn metadata_path_for_composites() {
        let path = metadata_path(Path::new("main/collections"), "Orders", Kind::Collection);
        assert_eq!(path, PathBuf::from("main/collections/Orders/_collection.yaml"));

        let path = metadata_path(Path::new(""), "main", Kind::Workspace);
        assert_eq!(path, PathBuf::from("main/_workspace.yaml"));
    }

    #[test]
    fn unique_name_unchanged_when_free() {
        let (fs, _tmp) = setup();
        assert_eq!(ensure_unique_name(&fs, Path::new("envs"), "dev", Kind::Environment), "dev");
    }

    #[test]
    fn unique_name_probes_suffixes_in_order() {
        let (fs, _tmp) = setup();
        fs.mkdir(Path::new("envs")).unwrap();
        fs.write(Path::new("envs/dev.yaml"), b"x").unwrap();
        fs.write(Path::new("envs/dev_1.yaml"), b"x").unwrap();

        assert_eq!(ensure_unique_name(&fs, Path::new("envs"), "dev", Kind::Environment), "dev_2");
    }

    #[test]
    fn unique_name_for_directories() {
        let (fs, _tmp) = setup();
        fs.mkdir(Path::new("cols/Orders")).unwrap();
        fs.write(Path::new("cols/Orders/_collection.yaml"), b"x").unwrap();
        // a leaf file of the same stem does not block a directory name
        fs.write(Path::new("cols/Users.yaml"), b"x").unwrap();

        assert_eq!(ensure_unique_name(&fs, Path::new("cols"), "Orders", Kind::Collection), "Orders_1");
        assert_eq!(ensure_unique_name(&fs, Path::new("cols"), "Users", Kind::Collection), "Users");
    }

    #[test]
    fn rename_moves_file() {
        let (fs, _tmp) = setup();
        fs.mkdir(Path::new("envs")).unwrap();
        fs.write(Path::new("envs/dev.yaml"), b"x").unwrap();

        rename_entity(&fs, Path::new("envs"), "dev", "staging", Kind::Environment).unwrap();

        assert!(!fs.exists(Path::new("envs/dev.yaml")));
        assert!(fs.exists(Path::new("envs/staging.yaml")));
    }

    #[test]
    fn rename_missing_source_is_an_error() {
        let (fs, _tmp) = setup();

        let err = rename_entity(&fs, Path::new("envs"), "dev", "staging", Kind::Environment)
            .unwrap_err();

        assert!(matches!(err, StoreError::RenameSourceMissing { .. }));
    }

    #[test]
    fn occupied_by_other_checks_id() {
        let (fs, _tmp) = setup();
        fs.mkdir(Path::new("envs")).unwrap();
        fs.write(Path::new("envs/dev.yaml"), doc("e1", "dev").as_bytes()).unwrap();

        let dir = Path::new("envs");
        assert!(!occupied_by_other(&fs, dir, "dev", Kind::Environment, "e1").unwrap());
        assert!(occupied_by_other(&fs, dir, "dev", Kind::Environment, "e2").unwrap());
        assert!(!occupied_by_other(&fs, dir, "prod", Kind::Environment, "e2").unwrap());
    }

    #[test]
    fn composite_without_metadata_is_occupied() {
        let (fs, _tmp) = setup();
        fs.mkdir(Path::new("cols/Orders")).unwrap();

        assert!(occupied_by_other(&fs, Path::new("cols"), "Orders", Kind::Collection, "c1").unwrap());
    }
}
