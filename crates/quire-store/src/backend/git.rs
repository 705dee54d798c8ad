//! Git-versioned backend.
//!
//! The data root is a git working tree. Every create, update and delete is
//! followed by a commit of the whole tree, every load is preceded by a pull,
//! and pushing is left to the caller. Without a remote URL and token, pull
//! and push do nothing and history stays local.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    Cred, ErrorCode, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks,
    Repository as GitRepo, RepositoryInitOptions, Signature, Sort,
};
use quire_types::{Collection, Entity, EntityMut, EntityRef, Kind, Preferences};
use tracing::{debug, info};

use crate::config::GitConfig;
use crate::error::{IoContext, RemoteOp, StoreError, StoreResult};
use crate::repository::{CommitSummary, Repository, VersionControl};
use crate::store::{EntityStore, RenamePolicy};

const REMOTE_NAME: &str = "origin";
const SHORT_HASH_LEN: usize = 7;

pub struct GitRepository {
    store: EntityStore,
    workspace: String,
    repo: GitRepo,
    config: GitConfig,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("data_dir", &self.store.data_dir())
            .field("workspace", &self.workspace)
            .field("branch", &self.config.branch())
            .field("remote_url", &self.config.remote_url)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository at `data_dir`, initializing it if needed.
    ///
    /// Adds (or repoints) the `origin` remote when a remote URL is
    /// configured.
    pub fn open(
        data_dir: impl Into<PathBuf>,
        workspace: impl Into<String>,
        config: GitConfig,
    ) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).at("create directory", &data_dir)?;

        let repo = open_or_init(&data_dir, config.branch())?;
        if !config.remote_url.is_empty() {
            ensure_origin(&repo, &config.remote_url)?;
        }

        let store = EntityStore::new(&data_dir, RenamePolicy::GuardCollisions);
        let workspace = workspace.into();

        info!(
            data_dir = %data_dir.display(),
            workspace = %workspace,
            remote = config.remote_enabled(),
            "opened git repository"
        );

        Ok(Self {
            store,
            workspace,
            repo,
            config,
        })
    }

    /// Fetch the configured branch and fast-forward to it.
    ///
    /// A branch the remote does not have yet counts as up to date. A local
    /// branch that has diverged is an error; nothing is merged.
    pub fn pull(&self) -> StoreResult<()> {
        if !self.config.remote_enabled() {
            return Ok(());
        }

        let branch = self.config.branch();
        let remote_head = format!("refs/heads/{branch}");
        let tracking = format!("refs/remotes/{REMOTE_NAME}/{branch}");
        let pull_err = |e: git2::Error| StoreError::remote(RemoteOp::Pull, e.message());

        let mut remote = self.repo.find_remote(REMOTE_NAME).map_err(pull_err)?;

        // a refspec the remote cannot satisfy leaves the tracking ref absent
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.remote_callbacks());
        let refspec = format!("{remote_head}:{tracking}");
        remote
            .fetch(&[refspec.as_str()], Some(&mut options), None)
            .map_err(pull_err)?;

        self.fast_forward(branch, &tracking)
    }

    /// Push the configured branch to `origin`.
    pub fn push(&self) -> StoreResult<()> {
        if !self.config.remote_enabled() {
            return Ok(());
        }

        let branch = self.config.branch();
        let local = format!("refs/heads/{branch}");
        match self.repo.find_reference(&local) {
            Ok(_) => {}
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(branch, "nothing committed yet, skipping push");
                return Ok(());
            }
            Err(e) => return Err(StoreError::git("find branch", e)),
        }

        let push_err = |e: git2::Error| StoreError::remote(RemoteOp::Push, e.message());
        let mut remote = self.repo.find_remote(REMOTE_NAME).map_err(push_err)?;
        let refspec = format!("{local}:{local}");

        let rejected: RefCell<Option<String>> = RefCell::new(None);
        {
            let mut callbacks = self.remote_callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(msg) = status {
                    *rejected.borrow_mut() = Some(format!("{refname}: {msg}"));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(push_err)?;
        }

        if let Some(message) = rejected.into_inner() {
            return Err(StoreError::remote(RemoteOp::Push, message));
        }

        info!(branch, "pushed");
        Ok(())
    }

    /// Commits reachable from HEAD, newest first. Empty before the first commit.
    pub fn commit_history(&self) -> StoreResult<Vec<CommitSummary>> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }

        let git_err = |e| StoreError::git("walk history", e);
        let mut walk = self.repo.revwalk().map_err(git_err)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME).map_err(git_err)?;
        walk.push_head().map_err(git_err)?;

        let mut out = Vec::new();
        for oid in walk {
            let oid = oid.map_err(git_err)?;
            let commit = self.repo.find_commit(oid).map_err(git_err)?;
            let mut short_hash = oid.to_string();
            short_hash.truncate(SHORT_HASH_LEN);
            out.push(CommitSummary {
                short_hash,
                message: commit.message().unwrap_or_default().trim_end().to_string(),
            });
        }
        Ok(out)
    }

    /// Stage the whole working tree and commit it.
    ///
    /// Nothing is committed when the staged tree matches HEAD, so saving
    /// unchanged content leaves history alone.
    fn commit(&self, message: &str) -> StoreResult<()> {
        let git_err = |e| StoreError::git("commit", e);

        let mut index = self.repo.index().map_err(git_err)?;
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .map_err(git_err)?;
        // add_all does not stage removals
        index.update_all(["*"], None).map_err(git_err)?;
        index.write().map_err(git_err)?;
        let tree_id = index.write_tree().map_err(git_err)?;

        let parent = self.head_commit()?;
        let unchanged = match &parent {
            Some(commit) => commit.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            debug!(message, "working tree clean, nothing to commit");
            return Ok(());
        }

        let tree = self.repo.find_tree(tree_id).map_err(git_err)?;
        let author = self.config.author();
        let signature =
            Signature::now(author, &format!("{author}@quire.local")).map_err(git_err)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(git_err)?;

        info!(commit = %oid, message, "committed");
        Ok(())
    }

    fn head_commit(&self) -> StoreResult<Option<git2::Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => head
                .peel_to_commit()
                .map(Some)
                .map_err(|e| StoreError::git("read HEAD", e)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(StoreError::git("read HEAD", e)),
        }
    }

    /// Move the local branch to `tracking` when that is a fast-forward.
    ///
    /// The new tree is checked out before the branch moves, and the checkout
    /// refuses to overwrite local edits, so uncommitted changes surface as a
    /// pull error and the branch stays where it was.
    fn fast_forward(&self, branch: &str, tracking: &str) -> StoreResult<()> {
        let git_err = |e| StoreError::git("fast-forward", e);
        let local = format!("refs/heads/{branch}");

        let fetched = match self.repo.find_reference(tracking) {
            Ok(reference) => reference,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(branch, "remote has no such branch yet");
                return Ok(());
            }
            Err(e) => return Err(git_err(e)),
        };
        let incoming = self
            .repo
            .reference_to_annotated_commit(&fetched)
            .map_err(git_err)?;
        let (analysis, _) = self.repo.merge_analysis(&[&incoming]).map_err(git_err)?;

        if analysis.is_up_to_date() {
            debug!(branch, "already up to date");
            return Ok(());
        }
        if !analysis.is_unborn() && !analysis.is_fast_forward() {
            return Err(StoreError::remote(
                RemoteOp::Pull,
                format!("local {branch} has diverged from {REMOTE_NAME}/{branch}; cannot fast-forward"),
            ));
        }

        let target = self.repo.find_commit(incoming.id()).map_err(git_err)?;
        self.repo
            .checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))
            .map_err(|e| {
                StoreError::remote(
                    RemoteOp::Pull,
                    format!("local changes would be overwritten: {}", e.message()),
                )
            })?;

        if analysis.is_unborn() {
            self.repo
                .reference(&local, incoming.id(), true, "pull: initial")
                .map_err(git_err)?;
        } else {
            let mut reference = self.repo.find_reference(&local).map_err(git_err)?;
            reference
                .set_target(incoming.id(), "pull: fast-forward")
                .map_err(git_err)?;
        }
        self.repo.set_head(&local).map_err(git_err)?;

        info!(branch, commit = %incoming.id(), "pulled");
        Ok(())
    }

    /// Basic auth with the configured username and token.
    fn remote_callbacks<'cb>(&self) -> RemoteCallbacks<'cb> {
        let username = self.config.author().to_string();
        let token = self.config.token.clone();
        let mut attempts = 0u32;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, _username_from_url, _allowed| {
            // libgit2 asks again after a rejection; only offer the token once
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::from_str("credentials rejected"));
            }
            Cred::userpass_plaintext(&username, &token)
        });
        callbacks
    }

    fn commit_message(verb: &str, kind: Kind, name: &str) -> String {
        format!("{verb} {}: {name}", kind.label())
    }
}

fn open_or_init(dir: &Path, branch: &str) -> StoreResult<GitRepo> {
    match GitRepo::open(dir) {
        Ok(repo) => Ok(repo),
        Err(e) if e.code() == ErrorCode::NotFound => {
            let mut options = RepositoryInitOptions::new();
            options.initial_head(branch);
            info!(dir = %dir.display(), branch, "initializing git repository");
            GitRepo::init_opts(dir, &options).map_err(|e| StoreError::git("init repository", e))
        }
        Err(e) => Err(StoreError::git("open repository", e)),
    }
}

fn ensure_origin(repo: &GitRepo, url: &str) -> StoreResult<()> {
    match repo.find_remote(REMOTE_NAME) {
        Ok(remote) if remote.url() == Some(url) => Ok(()),
        Ok(_) => repo
            .remote_set_url(REMOTE_NAME, url)
            .map_err(|e| StoreError::git("set remote url", e)),
        Err(e) if e.code() == ErrorCode::NotFound => repo
            .remote(REMOTE_NAME, url)
            .map(|_| ())
            .map_err(|e| StoreError::git("add remote", e)),
        Err(e) => Err(StoreError::git("find remote", e)),
    }
}

impl Repository for GitRepository {
    fn active_workspace(&self) -> &str {
        &self.workspace
    }

    fn set_active_workspace(&mut self, name: &str) {
        self.workspace = name.to_string();
    }

    fn load(&mut self, kind: Kind) -> StoreResult<Vec<Entity>> {
        self.pull()?;
        self.store.load(kind, &self.workspace)
    }

    fn create(&mut self, mut entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        self.store.create(&self.workspace, &mut entity, collection)?;
        self.commit(&Self::commit_message("Add", entity.kind(), entity.name()))
    }

    fn update(&mut self, mut entity: EntityMut<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        self.store.update(&self.workspace, &mut entity, collection)?;
        self.commit(&Self::commit_message("Update", entity.kind(), entity.name()))
    }

    fn delete(&mut self, entity: EntityRef<'_>, collection: Option<&Collection>) -> StoreResult<()> {
        let removed = self.store.delete(&self.workspace, entity, collection)?;
        self.commit(&Self::commit_message("Delete", entity.kind(), &removed))
    }

    fn load_preferences(&mut self) -> StoreResult<Preferences> {
        self.pull()?;
        self.store.load_preferences()
    }

    fn update_preferences(&mut self, preferences: &Preferences) -> StoreResult<()> {
        self.store.update_preferences(preferences)?;
        self.commit("Update preferences")
    }

    fn version_control(&mut self) -> Option<&mut dyn VersionControl> {
        Some(self)
    }
}

impl VersionControl for GitRepository {
    fn pull(&mut self) -> StoreResult<()> {
        GitRepository::pull(self)
    }

    fn push(&mut self) -> StoreResult<()> {
        GitRepository::push(self)
    }

    fn commit_history(&self) -> StoreResult<Vec<CommitSummary>> {
        GitRepository::commit_history(self)
    }
}
