//! Git backend: commits, history and sync through a local bare remote.

use std::path::Path;

use quire_store::{GitConfig, GitRepository, RemoteOp, Repository, StoreError};
use quire_types::{Environment, Preferences};
use tempfile::TempDir;

/// A bare repository standing in for the shared remote.
fn bare_remote() -> TempDir {
    let dir = TempDir::new().unwrap();
    git2::Repository::init_bare(dir.path()).unwrap();
    dir
}

fn remote_config(remote: &Path, username: &str) -> GitConfig {
    GitConfig {
        remote_url: remote.to_string_lossy().into_owned(),
        username: username.to_string(),
        token: "test-token".to_string(),
        ..GitConfig::default()
    }
}

fn clone_of(remote: &Path, username: &str) -> (GitRepository, TempDir) {
    let dir = TempDir::new().unwrap();
    let repo = GitRepository::open(dir.path(), "main", remote_config(remote, username)).unwrap();
    (repo, dir)
}

fn env_names(repo: &mut GitRepository) -> Vec<String> {
    let mut names: Vec<String> = repo
        .load_environments()
        .unwrap()
        .into_iter()
        .map(|e| e.metadata.name)
        .collect();
    names.sort();
    names
}

// ============================================================================
// Commits
// ============================================================================

#[test]
fn unchanged_update_adds_no_commit() {
    let tmp = TempDir::new().unwrap();
    let mut repo = GitRepository::open(tmp.path(), "main", GitConfig::default()).unwrap();

    let mut env = Environment::new("e1", "dev");
    repo.create_environment(&mut env).unwrap();
    env.set_value("HOST", "localhost");
    repo.update_environment(&mut env).unwrap();
    repo.update_environment(&mut env).unwrap();

    let history = repo.commit_history().unwrap();
    assert_eq!(history.len(), 2, "{history:?}");
    assert_eq!(history[0].message, "Update environment: dev");
    assert_eq!(history[1].message, "Add environment: dev");
}

#[test]
fn commits_use_configured_author() {
    let tmp = TempDir::new().unwrap();
    let config = GitConfig {
        username: "amy".to_string(),
        ..GitConfig::default()
    };
    let mut repo = GitRepository::open(tmp.path(), "main", config).unwrap();
    repo.create_environment(&mut Environment::new("e1", "dev")).unwrap();

    let git = git2::Repository::open(tmp.path()).unwrap();
    let head = git.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.author().name(), Some("amy"));
    assert_eq!(head.author().email(), Some("amy@quire.local"));
}

#[test]
fn deletes_are_committed() {
    let tmp = TempDir::new().unwrap();
    let mut repo = GitRepository::open(tmp.path(), "main", GitConfig::default()).unwrap();

    let mut env = Environment::new("e1", "dev");
    repo.create_environment(&mut env).unwrap();
    repo.delete_environment(&env).unwrap();

    let git = git2::Repository::open(tmp.path()).unwrap();
    let tree = git.head().unwrap().peel_to_tree().unwrap();
    assert!(tree.get_path(Path::new("main/environments/dev.yaml")).is_err());
}

#[test]
fn delete_message_names_the_removed_entity() {
    let tmp = TempDir::new().unwrap();
    let mut repo = GitRepository::open(tmp.path(), "main", GitConfig::default()).unwrap();

    let mut env = Environment::new("e1", "dev");
    repo.create_environment(&mut env).unwrap();
    // renamed in memory only, never saved
    env.metadata.name = "staging".to_string();
    repo.delete_environment(&env).unwrap();

    let history = repo.commit_history().unwrap();
    assert_eq!(history[0].message, "Delete environment: dev");
}

#[test]
fn reopening_keeps_history() {
    let tmp = TempDir::new().unwrap();
    {
        let mut repo = GitRepository::open(tmp.path(), "main", GitConfig::default()).unwrap();
        repo.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    }

    let repo = GitRepository::open(tmp.path(), "main", GitConfig::default()).unwrap();
    assert_eq!(repo.commit_history().unwrap().len(), 1);
}

// ============================================================================
// Remote sync
// ============================================================================

#[test]
fn load_from_empty_remote_is_up_to_date() {
    let remote = bare_remote();
    let (mut repo, _dir) = clone_of(remote.path(), "amy");

    assert!(env_names(&mut repo).is_empty());
    assert_eq!(repo.load_preferences().unwrap(), Preferences::default());
    assert!(repo.commit_history().unwrap().is_empty());

    // and the first push still lands
    repo.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    repo.push().unwrap();
    assert_eq!(env_names(&mut repo), vec!["dev"]);
}

#[test]
fn push_then_load_in_another_clone() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, _b) = clone_of(remote.path(), "bob");

    // nothing on the remote yet
    assert!(env_names(&mut bob).is_empty());

    alice.create_environment(&mut Environment::new("e1", "staging")).unwrap();
    alice.push().unwrap();

    assert_eq!(env_names(&mut bob), vec!["staging"]);
    assert_eq!(bob.commit_history().unwrap().len(), 1);
}

#[test]
fn load_fast_forwards_to_new_commits() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, _b) = clone_of(remote.path(), "bob");

    alice.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    alice.push().unwrap();
    assert_eq!(env_names(&mut bob), vec!["dev"]);

    alice.create_environment(&mut Environment::new("e2", "prod")).unwrap();
    alice.push().unwrap();

    assert_eq!(env_names(&mut bob), vec!["dev", "prod"]);
}

#[test]
fn push_is_explicit() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, _b) = clone_of(remote.path(), "bob");

    alice.create_environment(&mut Environment::new("e1", "dev")).unwrap();

    assert!(env_names(&mut bob).is_empty());
}

#[test]
fn rename_onto_pulled_entity_is_suffixed() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, bob_dir) = clone_of(remote.path(), "bob");

    let mut dev = Environment::new("e1", "dev");
    bob.create_environment(&mut dev).unwrap();
    bob.push().unwrap();

    env_names(&mut alice);
    alice.create_environment(&mut Environment::new("e9", "prod")).unwrap();
    alice.push().unwrap();

    // the pull brings in alice's "prod"
    env_names(&mut bob);
    dev.metadata.name = "prod".to_string();
    bob.update_environment(&mut dev).unwrap();

    assert_eq!(dev.metadata.name, "prod_1");
    let theirs = std::fs::read_to_string(bob_dir.path().join("main/environments/prod.yaml")).unwrap();
    assert!(theirs.contains("id: e9"));
    assert_eq!(env_names(&mut bob), vec!["prod", "prod_1"]);
}

#[test]
fn load_keeps_uncommitted_edits() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, bob_dir) = clone_of(remote.path(), "bob");

    let mut dev = Environment::new("e1", "dev");
    alice.create_environment(&mut dev).unwrap();
    alice.push().unwrap();
    assert_eq!(env_names(&mut bob), vec!["dev"]);

    dev.set_value("HOST", "api.internal");
    alice.update_environment(&mut dev).unwrap();
    alice.push().unwrap();

    // a save whose commit never happened
    let path = bob_dir.path().join("main/environments/dev.yaml");
    let mut pending = std::fs::read_to_string(&path).unwrap();
    pending.push_str("# pending edit\n");
    std::fs::write(&path, &pending).unwrap();

    let err = bob.load_environments().unwrap_err();

    assert!(matches!(err, StoreError::Remote { op: RemoteOp::Pull, .. }), "{err}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), pending);
    assert_eq!(bob.commit_history().unwrap().len(), 1);
}

#[test]
fn diverged_clone_cannot_push_or_pull() {
    let remote = bare_remote();
    let (mut alice, _a) = clone_of(remote.path(), "alice");
    let (mut bob, _b) = clone_of(remote.path(), "bob");

    alice.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    alice.push().unwrap();
    env_names(&mut bob);

    alice.create_environment(&mut Environment::new("e2", "prod")).unwrap();
    alice.push().unwrap();
    bob.create_environment(&mut Environment::new("e3", "qa")).unwrap();

    let err = bob.push().unwrap_err();
    assert!(matches!(err, StoreError::Remote { op: RemoteOp::Push, .. }), "{err}");

    let err = bob.load_environments().unwrap_err();
    assert!(matches!(err, StoreError::Remote { op: RemoteOp::Pull, .. }), "{err}");
}

#[test]
fn unreachable_remote_fails_load() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-remote.git");
    let data = TempDir::new().unwrap();
    let mut repo = GitRepository::open(data.path(), "main", remote_config(&missing, "amy")).unwrap();

    let err = repo.load_environments().unwrap_err();

    assert!(matches!(err, StoreError::Remote { op: RemoteOp::Pull, .. }), "{err}");
}

#[test]
fn url_without_token_stays_local() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-remote.git");
    let config = GitConfig {
        remote_url: missing.to_string_lossy().into_owned(),
        ..GitConfig::default()
    };
    let data = TempDir::new().unwrap();
    let mut repo = GitRepository::open(data.path(), "main", config).unwrap();

    repo.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    repo.push().unwrap();
    assert_eq!(env_names(&mut repo), vec!["dev"]);
}

#[test]
fn version_control_is_reachable_through_the_trait() {
    let remote = bare_remote();
    let data = TempDir::new().unwrap();
    let mut repo: Box<dyn Repository> = Box::new(
        GitRepository::open(data.path(), "main", remote_config(remote.path(), "amy")).unwrap(),
    );

    repo.create_environment(&mut Environment::new("e1", "dev")).unwrap();
    let vc = repo.version_control().unwrap();
    vc.push().unwrap();
    assert_eq!(vc.commit_history().unwrap().len(), 1);

    let remote_repo = git2::Repository::open_bare(remote.path()).unwrap();
    assert!(remote_repo.find_reference("refs/heads/main").is_ok());
}
