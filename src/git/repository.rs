//! [`Repository`]: the cached handle every other gateway submodule hangs
//! methods off of via `impl Repository` blocks, split across
//! `git/repository/{mod,branch,remotes,diff,...}.rs`-style files by concern.
//!
//! This crate's process model is single-threaded end to end, so the cache
//! lives behind a single `RefCell`, invalidated in bulk
//! (`*cache.borrow_mut() = RepoCache::default()`) after any mutating
//! command.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::rc::Rc;

use anyhow::Context;

use super::GitError;

/// Per-repository cache, invalidated wholesale after any mutating command.
#[derive(Debug, Default)]
pub(super) struct RepoCache {
    pub(super) git_dir: Option<PathBuf>,
    pub(super) toplevel: Option<Option<PathBuf>>,
    pub(super) git_version: Option<String>,
    pub(super) local_branches: Option<Vec<String>>,
    pub(super) remote_branches: Option<Vec<String>>,
    pub(super) remotes: Option<Vec<String>>,
    pub(super) remote_urls: HashMap<String, Option<String>>,
    pub(super) commit_hash: HashMap<String, Option<String>>,
    pub(super) tree_hash: HashMap<String, Option<String>>,
    pub(super) committer_timestamp: HashMap<String, Option<i64>>,
    pub(super) merge_base: HashMap<(String, String), Option<String>>,
    pub(super) tracking_counterpart: HashMap<String, Option<String>>,
    pub(super) fetched_remotes: HashMap<String, ()>,
}

/// What kind of operation `git` reports as in-progress for the worktree,
/// detected from marker files under the git directory rather than by
/// parsing porcelain output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationInProgress {
    Merge,
    Rebase,
    CherryPick,
    Revert,
    Bisect,
    AmApply,
}

impl OperationInProgress {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationInProgress::Merge => "merge",
            OperationInProgress::Rebase => "rebase",
            OperationInProgress::CherryPick => "cherry-pick",
            OperationInProgress::Revert => "revert",
            OperationInProgress::Bisect => "bisect",
            OperationInProgress::AmApply => "am",
        }
    }
}

/// A handle onto one repository, cheap to clone (clones share the cache).
#[derive(Debug, Clone)]
pub struct Repository {
    /// Directory `git` commands are run from; any path inside the repo works
    /// for repo-wide queries.
    discovery_path: PathBuf,
    pub(super) cache: Rc<RefCell<RepoCache>>,
}

impl Repository {
    /// Discover the repository containing the current directory.
    pub fn current() -> anyhow::Result<Self> {
        Self::at(std::env::current_dir().context("failed to read current directory")?)
    }

    /// Discover the repository containing `path`.
    pub fn at(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let discovery_path = path.into();
        let repo = Self {
            discovery_path,
            cache: Rc::new(RefCell::new(RepoCache::default())),
        };
        // Fail fast if this isn't actually inside a git repository.
        repo.git_dir()?;
        Ok(repo)
    }

    fn logging_context(&self) -> String {
        if self.discovery_path == Path::new(".") {
            ".".to_string()
        } else {
            self.discovery_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.discovery_path.display().to_string())
        }
    }

    pub fn discovery_path(&self) -> &Path {
        &self.discovery_path
    }

    /// Run a git command, returning trimmed stdout on success.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = self.run_raw(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr,
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git command and report only success/failure (e.g.
    /// `merge-base --is-ancestor`, which uses the exit code as its result).
    pub fn run_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        Ok(self.run_raw(args)?.status.success())
    }

    /// Run a git command that mutates repository state: runs it, then drops
    /// every cached value so the next query re-reads ground truth.
    pub fn run_mutating(&self, args: &[&str]) -> anyhow::Result<String> {
        let result = self.run(args);
        self.invalidate();
        result
    }

    pub(super) fn run_raw(&self, args: &[&str]) -> anyhow::Result<Output> {
        log::debug!("$ git {} [{}]", args.join(" "), self.logging_context());
        Command::new("git")
            .args(args)
            .current_dir(&self.discovery_path)
            .output()
            .with_context(|| format!("failed to execute: git {}", args.join(" ")))
    }

    /// Drop every cached value. Called after any mutating command.
    pub(super) fn invalidate(&self) {
        *self.cache.borrow_mut() = RepoCache::default();
    }

    // ---- repository info -------------------------------------------------

    /// The `.git` directory (for worktrees, the worktree-specific one, not
    /// the shared common dir — see `common_dir()`).
    pub fn git_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(p) = self.cache.borrow().git_dir.clone() {
            return Ok(p);
        }
        let out = self.run(&["rev-parse", "--git-dir"])?;
        let path = PathBuf::from(out);
        let abs = if path.is_relative() {
            self.discovery_path.join(&path)
        } else {
            path
        };
        let abs = abs.canonicalize().unwrap_or(abs);
        self.cache.borrow_mut().git_dir = Some(abs.clone());
        Ok(abs)
    }

    /// The shared `.git` directory across all worktrees ("File
    /// location": the default location for the branch-layout file).
    pub fn common_dir(&self) -> anyhow::Result<PathBuf> {
        let out = self.run(&["rev-parse", "--path-format=absolute", "--git-common-dir"])?;
        Ok(PathBuf::from(out))
    }

    /// The worktree's top-level directory, or `None` for a bare repository.
    pub fn toplevel(&self) -> anyhow::Result<Option<PathBuf>> {
        if let Some(cached) = self.cache.borrow().toplevel.clone() {
            return Ok(cached);
        }
        let output = self.run_raw(&["rev-parse", "--show-toplevel"])?;
        let result = if output.status.success() {
            Some(PathBuf::from(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            None
        };
        self.cache.borrow_mut().toplevel = Some(result.clone());
        Ok(result)
    }

    pub fn git_version(&self) -> anyhow::Result<String> {
        if let Some(v) = self.cache.borrow().git_version.clone() {
            return Ok(v);
        }
        let out = self.run(&["--version"])?;
        let version = out.strip_prefix("git version ").unwrap_or(&out).to_string();
        self.cache.borrow_mut().git_version = Some(version.clone());
        Ok(version)
    }

    /// The name of the currently checked-out branch, or `None` if HEAD is
    /// detached.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let output = self.run_raw(&["symbolic-ref", "--short", "-q", "HEAD"])?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    /// The current branch, or a `GitState`/`DetachedHead` error describing
    /// what `action` needed one.
    pub fn require_current_branch(&self, action: &str) -> anyhow::Result<String> {
        self.current_branch()?
            .ok_or_else(|| GitError::DetachedHead { action: Some(action.into()) }.into())
    }

    /// Any rebase/merge/cherry-pick/revert/bisect currently in progress,
    /// detected via marker files rather than porcelain parsing.
    pub fn operation_in_progress(&self) -> anyhow::Result<Option<OperationInProgress>> {
        let git_dir = self.git_dir()?;
        if git_dir.join("MERGE_HEAD").exists() {
            return Ok(Some(OperationInProgress::Merge));
        }
        if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
            return Ok(Some(OperationInProgress::Rebase));
        }
        if git_dir.join("CHERRY_PICK_HEAD").exists() {
            return Ok(Some(OperationInProgress::CherryPick));
        }
        if git_dir.join("REVERT_HEAD").exists() {
            return Ok(Some(OperationInProgress::Revert));
        }
        if git_dir.join("BISECT_LOG").exists() {
            return Ok(Some(OperationInProgress::Bisect));
        }
        Ok(None)
    }
}
