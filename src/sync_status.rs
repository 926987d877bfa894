//! Sync-status classification: edge status against a branch's parent, and
//! remote-sync status against its tracking counterpart.
//!
//! Squash-merge detection walks candidate commits on the upstream side
//! looking for a matching tree (or, in exact mode, a matching patch id).

use crate::branch::LocalBranchShortName;
use crate::forkpoint::{self, ReflogIndex};
use crate::git::Repository;
use crate::styling::{DIM, GREEN, RED, YELLOW};

/// Squash-merge detection mode (git-config key
/// `machete.squashMergeDetection`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SquashMergeDetection {
    None,
    #[default]
    Simple,
    Exact,
}

/// Parent edge status of a non-root branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    MergedToParent,
    OutOfSync,
    InSyncButForkPointOff,
    InSync,
}

impl EdgeStatus {
    pub fn style(self) -> anstyle::Style {
        match self {
            EdgeStatus::InSync => GREEN,
            EdgeStatus::InSyncButForkPointOff => YELLOW,
            EdgeStatus::OutOfSync => RED,
            EdgeStatus::MergedToParent => DIM,
        }
    }

    /// ASCII junction glyph keyed by status (upstream
    /// `sync_to_parent_status_to_junction_ascii_only_map`).
    pub fn ascii_junction(self) -> &'static str {
        match self {
            EdgeStatus::InSync => "o-",
            EdgeStatus::InSyncButForkPointOff => "?-",
            EdgeStatus::OutOfSync => "x-",
            EdgeStatus::MergedToParent => "m-",
        }
    }
}

/// Remote-sync status of a branch relative to its tracking counterpart
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSyncStatus {
    NoRemotes,
    Untracked,
    InSyncWithRemote,
    BehindRemote,
    AheadOfRemote,
    DivergedNewerThanRemote,
    DivergedOlderThanRemote,
}

impl RemoteSyncStatus {
    pub fn needs_action(self) -> bool {
        !matches!(self, RemoteSyncStatus::NoRemotes | RemoteSyncStatus::InSyncWithRemote)
    }
}

/// Is `b` merged into `u`, per the requested detection mode.
pub fn is_merged_to(
    repo: &Repository,
    branch: &LocalBranchShortName,
    upstream: &LocalBranchShortName,
    mode: SquashMergeDetection,
) -> anyhow::Result<bool> {
    let branch_full = branch.to_full().as_str().to_string();
    let upstream_full = upstream.to_full().as_str().to_string();

    if repo.is_ancestor_or_equal(&branch_full, &upstream_full)? {
        // A freshly created but never-advanced branch (empty filtered
        // reflog) is not considered merged.
        let reflog = forkpoint::filtered_reflog(repo, &branch_full, branch.as_str(), branch.as_str())?;
        return Ok(!reflog.is_empty());
    }

    if mode == SquashMergeDetection::None {
        return Ok(false);
    }

    let branch_tree = repo.resolve_tree_hash(&branch_full)?;
    let Some(branch_tree) = branch_tree else { return Ok(false) };
    let upstream_tips = repo.commits_between(&branch_full, &upstream_full)?;
    for commit in &upstream_tips {
        if repo.resolve_tree_hash(&commit.full_hash)?.as_deref() == Some(branch_tree.as_str()) {
            return Ok(true);
        }
    }
    // Also check whether upstream's tip tree itself matches (covers the
    // common case of the squash commit being upstream's current HEAD).
    if repo.resolve_tree_hash(&upstream_full)?.as_deref() == Some(branch_tree.as_str()) {
        return Ok(true);
    }

    if mode != SquashMergeDetection::Exact {
        return Ok(false);
    }

    let Some(merge_base) = repo.merge_base(&upstream_full, &branch_full)? else {
        return Ok(false);
    };
    let Some(branch_patch_id) = repo.patch_id_of_range(&merge_base, &branch_full)? else {
        return Ok(false);
    };
    const MAX_CANDIDATES: usize = 100;
    let candidates = repo.commits_between(&merge_base, &upstream_full)?;
    for commit in candidates.iter().rev().take(MAX_CANDIDATES) {
        if repo.patch_id_of_commit(&commit.full_hash)?.as_deref() == Some(branch_patch_id.as_str()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Classify the parent edge of `branch` with parent `upstream`.
pub fn classify_edge(
    repo: &Repository,
    index: &ReflogIndex,
    branch: &LocalBranchShortName,
    upstream: &LocalBranchShortName,
    use_overrides: bool,
    squash_mode: SquashMergeDetection,
) -> anyhow::Result<EdgeStatus> {
    if is_merged_to(repo, branch, upstream, squash_mode)? {
        return Ok(EdgeStatus::MergedToParent);
    }

    let branch_full = branch.to_full().as_str().to_string();
    let upstream_full = upstream.to_full().as_str().to_string();

    if !repo.is_ancestor_or_equal(&upstream_full, &branch_full)? {
        return Ok(EdgeStatus::OutOfSync);
    }

    let has_override = use_overrides && forkpoint::overridden_fork_point(repo, branch)?.is_some();
    if has_override {
        return Ok(EdgeStatus::InSync);
    }

    let fork_point = forkpoint::fork_point(repo, index, branch, Some(upstream), use_overrides)?;
    let upstream_tip = repo
        .resolve_commit_hash(&upstream_full)?
        .ok_or_else(|| anyhow::anyhow!("{upstream} has no commits"))?;
    if fork_point == upstream_tip {
        Ok(EdgeStatus::InSync)
    } else {
        Ok(EdgeStatus::InSyncButForkPointOff)
    }
}

/// Classify the remote-sync status of `branch` against its tracking
/// counterpart.
pub fn classify_remote_sync(repo: &Repository, branch: &LocalBranchShortName) -> anyhow::Result<RemoteSyncStatus> {
    let has_remotes = !repo.remotes()?.is_empty();
    let Some(counterpart) = repo.strict_tracking_counterpart(branch.as_str())? else {
        return Ok(if has_remotes {
            RemoteSyncStatus::Untracked
        } else {
            RemoteSyncStatus::NoRemotes
        });
    };

    let branch_full = branch.to_full().as_str().to_string();
    let counterpart_full = format!("refs/remotes/{counterpart}");
    let b_ancestor_of_r = repo.is_ancestor_or_equal(&branch_full, &counterpart_full)?;
    let r_ancestor_of_b = repo.is_ancestor_or_equal(&counterpart_full, &branch_full)?;

    Ok(match (b_ancestor_of_r, r_ancestor_of_b) {
        (true, true) => RemoteSyncStatus::InSyncWithRemote,
        (true, false) => RemoteSyncStatus::BehindRemote,
        (false, true) => RemoteSyncStatus::AheadOfRemote,
        (false, false) => {
            let b_ts = repo.committer_timestamp(&branch_full)?.unwrap_or(0);
            let r_ts = repo.committer_timestamp(&counterpart_full)?.unwrap_or(0);
            if b_ts > r_ts {
                RemoteSyncStatus::DivergedNewerThanRemote
            } else {
                RemoteSyncStatus::DivergedOlderThanRemote
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_status_ascii_junctions_match_spec() {
        assert_eq!(EdgeStatus::InSync.ascii_junction(), "o-");
        assert_eq!(EdgeStatus::InSyncButForkPointOff.ascii_junction(), "?-");
        assert_eq!(EdgeStatus::OutOfSync.ascii_junction(), "x-");
        assert_eq!(EdgeStatus::MergedToParent.ascii_junction(), "m-");
    }

    #[test]
    fn remote_sync_needs_action_excludes_in_sync_and_no_remotes() {
        assert!(!RemoteSyncStatus::NoRemotes.needs_action());
        assert!(!RemoteSyncStatus::InSyncWithRemote.needs_action());
        assert!(RemoteSyncStatus::BehindRemote.needs_action());
        assert!(RemoteSyncStatus::AheadOfRemote.needs_action());
    }
}
