//! Operation primitives.
//!
//! [`Session`] owns the git gateway handle and the in-memory layout, and
//! every operation below is a method on it, one concern per file.
//!
//! The `machete-pre-rebase` hook veto lives here, one layer above
//! [`crate::git::Repository::rebase`] — see that method's doc comment for why.

mod add;
mod advance;
mod anno;
mod clean;
mod diff_log;
mod discover;
mod hosting_ops;
mod nav;
mod reapply;
mod slide_out;
mod squash;
mod update;

pub use add::AddOptions;
pub use discover::DiscoverOptions;
pub use nav::Direction;

use std::io::Write;
use std::path::PathBuf;

use crate::branch::LocalBranchShortName;
use crate::config::MacheteSettings;
use crate::error::MacheteError;
use crate::forkpoint::ReflogIndex;
use crate::git::Repository;
use crate::layout::{self, Layout};

/// Owns the git gateway handle and the in-memory branch layout for one
/// invocation; every operation primitive is a method on this struct.
pub struct Session {
    pub repo: Repository,
    pub layout: Layout,
    pub settings: MacheteSettings,
    path: PathBuf,
    /// Skip interactive confirmations (`--yes`/`-y`).
    pub assume_yes: bool,
}

impl Session {
    /// Open the repository at the current directory and load its
    /// branch-layout file.
    pub fn open(assume_yes: bool) -> anyhow::Result<Self> {
        Self::open_at(Repository::current()?, assume_yes)
    }

    /// Same as [`Session::open`], but against an already-resolved
    /// [`Repository`] handle rather than the process's current directory —
    /// what tests use to avoid mutating global process state.
    pub fn open_at(repo: Repository, assume_yes: bool) -> anyhow::Result<Self> {
        let settings = MacheteSettings::load(&repo)?;
        let path = layout::machete_file_path(&repo, settings.use_top_level_machete_file)?;
        let layout = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let existing = repo.local_branches()?;
            let outcome = layout::parse(&path, &contents, Some(&existing))?;
            let mut layout = outcome.layout;
            if !outcome.invalid_branches.is_empty() {
                for branch in &outcome.invalid_branches {
                    crate::warn::warn(format!("branch {branch} listed in the branch layout no longer exists; removing it"));
                }
                layout.slide_out_all(&outcome.invalid_branches);
            }
            layout
        } else {
            Layout::empty()
        };
        Ok(Session {
            repo,
            layout,
            settings,
            path,
            assume_yes,
        })
    }

    pub fn require_managed(&self, branch: &LocalBranchShortName) -> anyhow::Result<()> {
        if self.layout.is_managed(branch) {
            Ok(())
        } else {
            Err(MacheteError::user_input(format!("branch {branch} is not managed by git machete")).into())
        }
    }

    pub fn require_parent(&self, branch: &LocalBranchShortName) -> anyhow::Result<LocalBranchShortName> {
        self.layout
            .parent_of(branch)
            .cloned()
            .ok_or_else(|| MacheteError::user_input(format!("branch {branch} has no parent in the branch layout")).into())
    }

    /// Save the branch-layout file, backing up the previous contents only
    /// when `backup` is requested (`discover` backs up,
    /// most other mutating operations don't).
    pub fn save_layout(&self, backup: bool) -> anyhow::Result<()> {
        layout::save(&self.path, &self.layout.render(), backup)
    }

    pub fn reflog_index(&self) -> anyhow::Result<ReflogIndex> {
        ReflogIndex::build(&self.repo)
    }

    pub fn fork_point_of(&self, index: &ReflogIndex, branch: &LocalBranchShortName) -> anyhow::Result<String> {
        let parent = self.layout.parent_of(branch);
        crate::forkpoint::fork_point(&self.repo, index, branch, parent, true)
    }

    /// Prompt the user with a yes/no question, honoring `--yes`. Returns
    /// `Ok(false)` on anything but an affirmative answer; does not implement
    /// the `q`/`yq` traversal cancellation vocabulary (see
    /// [`crate::traverse`] for that).
    pub fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        if self.assume_yes {
            println!("{prompt} (y)");
            return Ok(true);
        }
        print!("{prompt} (y/N) ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    /// Rebase `branch` onto `onto`, excluding everything up to and including
    /// `from_exclusive`, invoking `machete-pre-rebase` first and honoring its
    /// veto (the split from the pure gateway
    /// method is explained on [`crate::git::Repository::rebase`]).
    pub fn rebase_with_hook(&self, branch: &LocalBranchShortName, onto: &str, from_exclusive: &str) -> anyhow::Result<()> {
        let rebase_opts: Vec<String> = std::env::var("GIT_MACHETE_REBASE_OPTS")
            .ok()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let allowed = crate::hooks::run_pre_rebase(&self.repo, onto, from_exclusive, branch)?;
        if !allowed {
            return Err(MacheteError::git_state(
                format!("The machete-pre-rebase hook refused to rebase {branch}"),
                None,
            )
            .into());
        }
        self.repo.rebase(onto, from_exclusive, branch.as_str(), true, &rebase_opts)
    }
}
