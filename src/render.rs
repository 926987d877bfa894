//! Status renderer.
//!
//! Produces the indented tree `git machete status` prints: one connected
//! block per root, vertical-bar runs colored by ancestor edge status, a
//! junction glyph colored by the branch's own edge, then name/annotation/
//! remote-sync suffix/hook suffix.

use crate::branch::LocalBranchShortName;
use crate::forkpoint::ReflogIndex;
use crate::git::{OperationInProgress, Repository};
use crate::layout::Layout;
use crate::styling::{self, DIM, RED, YELLOW, bold, styled, underline};
use crate::sync_status::{self, EdgeStatus, RemoteSyncStatus, SquashMergeDetection};

pub struct RenderOptions {
    pub use_overrides: bool,
    pub squash_mode: SquashMergeDetection,
    pub list_commits: bool,
    pub extra_space_before_branch_name: bool,
}

/// One rendered status line, plus enough context for `--list-commits` to
/// emit the commit sub-listing right after it.
struct Line {
    text: String,
    branch: LocalBranchShortName,
    edge_status: Option<EdgeStatus>,
    fork_point: Option<String>,
}

pub fn render_status(
    repo: &Repository,
    layout: &Layout,
    options: &RenderOptions,
) -> anyhow::Result<(String, Vec<LocalBranchShortName>)> {
    let index = ReflogIndex::build(repo)?;
    let current_branch = repo.current_branch()?;
    let operation = repo.operation_in_progress()?;

    let mut lines = Vec::new();
    let mut fork_point_off = Vec::new();
    for root in &layout.roots {
        render_subtree(repo, layout, &index, options, root, Vec::new(), current_branch.as_deref(), operation, &mut lines, &mut fork_point_off)?;
    }

    let mut out = String::new();
    for line in &lines {
        out.push_str(&line.text);
        out.push('\n');
        if options.list_commits {
            if let Some(fp) = &line.fork_point {
                if line.edge_status != Some(EdgeStatus::MergedToParent) {
                    append_commit_listing(repo, &line.branch, fp, &mut out)?;
                }
            }
        }
    }

    Ok((out, fork_point_off))
}

#[allow(clippy::too_many_arguments)]
fn render_subtree(
    repo: &Repository,
    layout: &Layout,
    index: &ReflogIndex,
    options: &RenderOptions,
    branch: &LocalBranchShortName,
    ancestor_prefix: Vec<EdgeStatus>,
    current_branch: Option<&str>,
    operation: Option<OperationInProgress>,
    out: &mut Vec<Line>,
    fork_point_off: &mut Vec<LocalBranchShortName>,
) -> anyhow::Result<()> {
    let parent = layout.parent_of(branch).cloned();
    let edge_status = match &parent {
        Some(parent) => Some(sync_status::classify_edge(repo, index, branch, parent, options.use_overrides, options.squash_mode)?),
        None => None,
    };
    if edge_status == Some(EdgeStatus::InSyncButForkPointOff) {
        fork_point_off.push(branch.clone());
    }

    let mut prefix = String::new();
    for status in &ancestor_prefix {
        prefix.push_str(&styled("│ ", status.style()));
    }
    let junction = edge_status.map(|s| {
        if styling::ascii_only() {
            s.ascii_junction().to_string()
        } else {
            "└─".to_string()
        }
    });
    if let Some(j) = &junction {
        prefix.push_str(&styled(j, edge_status.expect("junction implies edge_status").style()));
    }

    let space = if options.extra_space_before_branch_name { " " } else { "" };
    let is_current = current_branch == Some(branch.as_str());
    let name = if is_current {
        let op_tag = operation.map(|o| format!("{} ", o.as_str().to_uppercase())).unwrap_or_default();
        format!("{op_tag}{}", bold(&underline(branch.as_str())))
    } else {
        branch.as_str().to_string()
    };

    let annotation = layout
        .annotations
        .get(branch)
        .map(|a| format!(" {}", a.formatted_full_text()))
        .filter(|s| s.trim() != "")
        .unwrap_or_default();

    let remote_status = sync_status::classify_remote_sync(repo, branch)?;
    let remote_suffix = remote_sync_suffix(repo, branch, remote_status)?;

    let mut line = format!("{prefix}{space}{name}{annotation}{remote_suffix}");
    if let Ok(Some(hook_line)) = crate::hooks::run_status_branch_hook(repo, branch) {
        line.push(' ');
        line.push_str(&hook_line);
    }

    let fork_point = if edge_status.is_some() {
        match edge_status {
            Some(EdgeStatus::InSyncButForkPointOff) => parent.as_ref().and_then(|p| repo.resolve_commit_hash(p.as_str()).ok().flatten()),
            _ => crate::forkpoint::fork_point(repo, index, branch, parent.as_ref(), options.use_overrides).ok(),
        }
    } else {
        None
    };

    out.push(Line {
        text: line,
        branch: branch.clone(),
        edge_status,
        fork_point,
    });

    let mut child_prefix = ancestor_prefix.clone();
    if let Some(status) = edge_status {
        child_prefix.push(status);
    }
    for child in layout.children_of(branch) {
        render_subtree(repo, layout, index, options, child, child_prefix.clone(), current_branch, operation, out, fork_point_off)?;
    }
    Ok(())
}

fn remote_sync_suffix(repo: &Repository, branch: &LocalBranchShortName, status: RemoteSyncStatus) -> anyhow::Result<String> {
    let counterpart = repo.strict_tracking_counterpart(branch.as_str())?;
    Ok(match status {
        RemoteSyncStatus::NoRemotes | RemoteSyncStatus::InSyncWithRemote => String::new(),
        RemoteSyncStatus::Untracked => format!(" ({})", styled("untracked", YELLOW)),
        RemoteSyncStatus::BehindRemote => format!(
            " ({})",
            styled(&format!("behind {}", counterpart.unwrap_or_default()), YELLOW)
        ),
        RemoteSyncStatus::AheadOfRemote => format!(
            " ({})",
            styled(&format!("ahead of {}", counterpart.unwrap_or_default()), RED)
        ),
        RemoteSyncStatus::DivergedNewerThanRemote => format!(
            " ({})",
            styled(&format!("diverged from {}", counterpart.unwrap_or_default()), RED)
        ),
        RemoteSyncStatus::DivergedOlderThanRemote => format!(
            " ({})",
            styled(&format!("diverged from (outdated) {}", counterpart.unwrap_or_default()), RED)
        ),
    })
}

fn append_commit_listing(repo: &Repository, branch: &LocalBranchShortName, fork_point: &str, out: &mut String) -> anyhow::Result<()> {
    let branch_full = branch.to_full().as_str().to_string();
    for commit in repo.commits_between(fork_point, &branch_full)? {
        out.push_str(&format!("  {} {}\n", commit.short_hash, commit.subject));
    }
    if let Some(subject) = repo.commit_subject(fork_point)? {
        let short = repo.short_hash(fork_point)?.unwrap_or_else(|| fork_point.to_string());
        out.push_str(&format!("  {} {}{}\n", short, subject, styled("  (fork point)", DIM)));
    }
    Ok(())
}
