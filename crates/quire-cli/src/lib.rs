//! quire command line.
//!
//! Commands run against a [`Repository`] and return their output as text so
//! they can be driven from tests without a terminal.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use quire_store::{Repository, StoreConfig, VersionControl, open_repository, paths};
use quire_types::{Kind, Request};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "quire", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/quire/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overriding config and QUIRE_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Workspace to operate on
    #[arg(short, long, global = true)]
    pub workspace: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List workspaces
    Workspaces,
    /// List entities of a kind in the active workspace
    List {
        /// workspace, collection, environment, request or protofile
        kind: Kind,
    },
    /// Show commit history (git backend)
    History,
    /// Fetch and fast-forward from the remote (git backend)
    Pull,
    /// Publish local commits to the remote (git backend)
    Push,
    /// One-shot data migrations
    Migrate {
        #[command(subcommand)]
        migration: Migration,
    },
}

#[derive(Debug, Subcommand)]
pub enum Migration {
    /// Set each request's type from whichever spec section it carries
    RequestTypes,
}

impl Cli {
    /// Resolve configuration: file, then environment, then flags.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = StoreConfig::load_from(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                if let Ok(dir) = std::env::var(paths::DATA_DIR_ENV) {
                    config.override_data_dir(dir);
                }
                config
            }
            None => StoreConfig::load().context("loading configuration")?,
        };

        if let Some(dir) = &self.data_dir {
            config.override_data_dir(dir);
        }
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        Ok(config)
    }
}

/// Parse-free entry point used by `main`.
pub fn run(cli: &Cli) -> Result<String> {
    let config = cli.store_config()?;
    info!(
        data_dir = %config.data_dir.display(),
        workspace = %config.workspace,
        backend = ?config.backend,
        "opening repository"
    );
    let mut repo = open_repository(&config).context("opening repository")?;
    execute(&cli.command, repo.as_mut())
}

pub fn execute(command: &Command, repo: &mut dyn Repository) -> Result<String> {
    match command {
        Command::Workspaces => list_workspaces(repo),
        Command::List { kind } => list(repo, *kind),
        Command::History => {
            let history = versioned(repo, "history")?.commit_history()?;
            Ok(history
                .iter()
                .map(|c| format!("{} {}", c.short_hash, c.message))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Pull => {
            versioned(repo, "pull")?.pull().context("pull failed")?;
            Ok("pulled".to_string())
        }
        Command::Push => {
            versioned(repo, "push")?.push().context("push failed")?;
            Ok("pushed".to_string())
        }
        Command::Migrate {
            migration: Migration::RequestTypes,
        } => migrate_request_types(repo),
    }
}

fn versioned<'a>(repo: &'a mut dyn Repository, what: &str) -> Result<&'a mut dyn VersionControl> {
    match repo.version_control() {
        Some(vc) => Ok(vc),
        None => bail!("{what} requires the git backend (set backend = \"git\" in config.toml)"),
    }
}

fn list_workspaces(repo: &mut dyn Repository) -> Result<String> {
    let active = repo.active_workspace().to_string();
    let lines: Vec<String> = repo
        .load_workspaces()?
        .into_iter()
        .map(|w| {
            let marker = if w.metadata.name == active { "*" } else { " " };
            format!("{marker} {}", w.metadata.name)
        })
        .collect();
    Ok(lines.join("\n"))
}

fn list(repo: &mut dyn Repository, kind: Kind) -> Result<String> {
    if kind == Kind::Workspace {
        return list_workspaces(repo);
    }

    let lines: Vec<String> = if kind == Kind::Collection {
        repo.load_collections()?
            .into_iter()
            .map(|c| format!("{} ({} requests)", c.metadata.name, c.requests.len()))
            .collect()
    } else {
        repo.load(kind)?
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    };
    Ok(lines.join("\n"))
}

/// Fill in a missing request type from whichever spec section is present.
fn fix_request_type(request: &mut Request) {
    if request.spec.request_type.is_none() {
        request.spec.request_type = request.infer_type();
    }
}

/// Rewrite every request with its type set.
///
/// Collection requests come back from a load with the type already filled
/// in memory, so whether a file needs the rewrite cannot be told from the
/// loaded value. Every request is saved; the git backend skips the commit
/// when nothing on disk changed.
fn migrate_request_types(repo: &mut dyn Repository) -> Result<String> {
    let original = repo.active_workspace().to_string();
    let workspaces = repo.load_workspaces()?;
    let mut saved = 0usize;

    for workspace in &workspaces {
        repo.set_active_workspace(&workspace.metadata.name);

        for mut request in repo.load_requests()? {
            fix_request_type(&mut request);
            repo.update_request(&mut request, None)
                .with_context(|| format!("updating request {}", request.metadata.name))?;
            saved += 1;
        }

        for mut collection in repo.load_collections()? {
            let requests = std::mem::take(&mut collection.requests);
            for mut request in requests {
                fix_request_type(&mut request);
                repo.update_request(&mut request, Some(&collection))
                    .with_context(|| {
                        format!(
                            "updating request {} in {}",
                            request.metadata.name, collection.metadata.name
                        )
                    })?;
                saved += 1;
            }
        }
    }

    repo.set_active_workspace(&original);
    info!(saved, workspaces = workspaces.len(), "request type migration done");
    Ok(format!(
        "saved {saved} requests across {} workspaces",
        workspaces.len()
    ))
}
