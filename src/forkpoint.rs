//! Fork-point inference engine.
//!
//! Matches a branch's history against filtered reflogs of every other
//! branch to infer where it forked, and supports persisted per-branch
//! overrides for when the inference guesses wrong.

use std::collections::HashMap;

use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;
use crate::git::Repository;

/// Spoon-feed limits for walking a branch's own commit log while searching
/// for a fork point — first a small batch, then the rest, matching upstream
/// `spoonfeed_log_hashes(initial_count=INITIAL_COMMIT_COUNT_FOR_LOG, ...)`.
const INITIAL_COMMIT_COUNT_FOR_LOG: usize = 10;
const TOTAL_COMMIT_COUNT_FOR_LOG: usize = 1000;

/// A (local branch, branch-or-its-remote-counterpart) pair that contains a
/// given commit in its filtered reflog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPair {
    pub local: LocalBranchShortName,
    pub local_or_remote: String,
}

/// Reflog entries of `branch` with the upstream-polluting subjects
/// excluded.
pub fn filtered_reflog(repo: &Repository, branch_full_name: &str, branch_display: &str, refname: &str) -> anyhow::Result<Vec<String>> {
    let entries = repo.reflog(refname)?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let mut hashes_to_exclude = std::collections::HashSet::new();
    // Reflog is returned oldest-first by `Repository::reflog`; the earliest
    // entry is index 0.
    let earliest = &entries[0];
    if earliest.subject.starts_with("branch: Created from") {
        hashes_to_exclude.insert(earliest.hash.clone());
    }

    let is_excluded = |hash: &str, subject: &str| -> bool {
        subject.starts_with("branch: Created from")
            || subject == format!("branch: Reset to {branch_display}")
            || subject == "branch: Reset to HEAD"
            || subject.starts_with("reset: moving to ")
            || subject.starts_with("fetch . ")
            || subject == format!("rebase finished: {branch_full_name} onto {hash}")
            || subject == format!("rebase -i (finish): {branch_full_name} onto {hash}")
            || subject == "update by push"
    };

    Ok(entries
        .into_iter()
        .filter(|e| !hashes_to_exclude.contains(&e.hash) && !is_excluded(&e.hash, &e.subject))
        .map(|e| e.hash)
        .collect())
}

/// Index from commit hash to the branches whose filtered reflog contains it
///, built once per run.
pub struct ReflogIndex {
    by_hash: HashMap<String, Vec<BranchPair>>,
}

impl ReflogIndex {
    pub fn build(repo: &Repository) -> anyhow::Result<Self> {
        let mut by_hash: HashMap<String, Vec<BranchPair>> = HashMap::new();
        for lb in repo.local_branches()? {
            let full = format!("refs/heads/{lb}");
            let mut lb_hashes = std::collections::HashSet::new();
            for hash in filtered_reflog(repo, &full, &lb, &lb)? {
                lb_hashes.insert(hash.clone());
                by_hash.entry(hash).or_default().push(BranchPair {
                    local: LocalBranchShortName::new(lb.clone())?,
                    local_or_remote: lb.clone(),
                });
            }
            if let Some(remote) = repo.combined_tracking_counterpart(&lb)? {
                for hash in filtered_reflog(repo, &format!("refs/remotes/{remote}"), &lb, &remote)? {
                    if !lb_hashes.contains(&hash) {
                        by_hash.entry(hash).or_default().push(BranchPair {
                            local: LocalBranchShortName::new(lb.clone())?,
                            local_or_remote: remote.clone(),
                        });
                    }
                }
            }
        }
        Ok(ReflogIndex { by_hash })
    }

    /// Walk `branch`'s own commit log (spoon-fed) and yield the first commit
    /// that appears in some *other* branch's filtered reflog, plus the
    /// (deduplicated, sorted) list of branches containing it.
    fn match_log(&self, repo: &Repository, branch: &LocalBranchShortName) -> anyhow::Result<Option<(String, Vec<BranchPair>)>> {
        let Some(tip) = repo.resolve_commit_hash(branch.as_str())? else {
            return Ok(None);
        };
        for batch_end in [INITIAL_COMMIT_COUNT_FOR_LOG, TOTAL_COMMIT_COUNT_FOR_LOG] {
            let out = repo.run(&["log", "--format=%H", &format!("-{batch_end}"), &tip])?;
            for hash in out.lines() {
                let Some(pairs) = self.by_hash.get(hash) else { continue };
                let mut containing: Vec<BranchPair> = pairs.iter().filter(|p| &p.local != branch).cloned().collect();
                if containing.is_empty() {
                    continue;
                }
                containing.sort_by(|a, b| a.local_or_remote.cmp(&b.local_or_remote));
                return Ok(Some((hash.to_string(), containing)));
            }
        }
        Ok(None)
    }
}

/// `fork_point(b, u)`: resolve branch `b`'s fork point relative to upstream `u`.
pub fn fork_point(
    repo: &Repository,
    index: &ReflogIndex,
    branch: &LocalBranchShortName,
    upstream: Option<&LocalBranchShortName>,
    use_overrides: bool,
) -> anyhow::Result<String> {
    let branch_full = branch.to_full().as_str().to_string();
    let upstream_full = upstream.map(|u| u.to_full().as_str().to_string());
    let upstream_hash = match &upstream_full {
        Some(u) => repo.resolve_commit_hash(u)?,
        None => None,
    };

    if use_overrides {
        if let Some(overridden) = overridden_fork_point(repo, branch)? {
            if let (Some(u), Some(u_full)) = (upstream, &upstream_full) {
                let u_is_ancestor = repo.is_ancestor_or_equal(u_full, &branch_full)?;
                if u_is_ancestor && !repo.is_ancestor_or_equal(u_full, &overridden)? {
                    let _ = u;
                    return upstream_hash.ok_or_else(|| MacheteError::internal("upstream hash missing").into());
                }
                if repo.is_ancestor_or_equal(&overridden, u_full)? {
                    return repo
                        .merge_base(u_full, &branch_full)?
                        .ok_or_else(|| MacheteError::internal("expected a common ancestor").into());
                }
            }
            return Ok(overridden);
        }
    }

    match index.match_log(repo, branch)? {
        None => {
            if let (Some(u_full), Some(u_hash)) = (&upstream_full, &upstream_hash) {
                if repo.is_ancestor_or_equal(u_full, &branch_full)? {
                    return Ok(u_hash.clone());
                }
                if let Some(ancestor) = repo.merge_base(u_full, &branch_full)? {
                    return Ok(ancestor);
                }
            }
            Err(MacheteError::git_state(
                format!("Fork point not found for branch {branch}"),
                Some(format!("git machete fork-point {branch} --override-to=<revision>")),
            )
            .into())
        }
        Some((computed, containing)) => {
            if let (Some(u_full), Some(u_hash)) = (&upstream_full, &upstream_hash) {
                if repo.is_ancestor_or_equal(u_full, &branch_full)? && !repo.is_ancestor_or_equal(u_full, &computed)? {
                    return Ok(u_hash.clone());
                }
                if !repo.is_ancestor_or_equal(u_full, &branch_full)? && repo.is_ancestor_or_equal(&computed, u_full)? {
                    return repo
                        .merge_base(u_full, &branch_full)?
                        .ok_or_else(|| MacheteError::internal("expected a common ancestor").into());
                }
            }

            let mut improved = computed.clone();
            for pair in &containing {
                if let Some(merge_base) = repo.merge_base(&pair.local_or_remote, &branch_full)? {
                    if repo.is_ancestor_or_equal(&improved, &merge_base)? && improved != merge_base {
                        improved = merge_base;
                    }
                }
            }
            Ok(improved)
        }
    }
}

/// Config keys for fork-point overrides.
fn override_to_key(branch: &LocalBranchShortName) -> String {
    format!("machete.overrideForkPoint.{branch}.to")
}

fn override_while_descendant_of_key(branch: &LocalBranchShortName) -> String {
    format!("machete.overrideForkPoint.{branch}.whileDescendantOf")
}

/// The configured override target, if any and if it's still an ancestor of
/// the branch's tip (a stale override is silently dropped with a warning).
pub fn overridden_fork_point(repo: &Repository, branch: &LocalBranchShortName) -> anyhow::Result<Option<String>> {
    let Some(target) = repo.config_get(&override_to_key(branch))? else {
        return Ok(None);
    };
    let branch_full = branch.to_full().as_str().to_string();
    if repo.is_ancestor_or_equal(&target, &branch_full)? {
        Ok(Some(target))
    } else {
        crate::warn::warn(format!(
            "fork point override for branch {branch} is no longer valid (target {target} is not an ancestor of its tip); ignoring"
        ));
        Ok(None)
    }
}

/// `set(b, revision)`.
pub fn set_override(repo: &Repository, branch: &LocalBranchShortName, revision: &str) -> anyhow::Result<()> {
    let resolved = repo
        .resolve_commit_hash(revision)?
        .ok_or_else(|| MacheteError::user_input(format!("`{revision}` does not resolve to a commit")))?;
    let branch_full = branch.to_full().as_str().to_string();
    if !repo.is_ancestor_or_equal(&resolved, &branch_full)? {
        return Err(MacheteError::user_input(format!(
            "Cannot override fork point of {branch}: {revision} is not an ancestor of its tip"
        ))
        .into());
    }
    repo.config_set(&override_to_key(branch), &resolved)?;
    repo.config_set(&override_while_descendant_of_key(branch), &resolved)?;
    Ok(())
}

/// `unset(b)`.
pub fn unset_override(repo: &Repository, branch: &LocalBranchShortName) -> anyhow::Result<()> {
    repo.config_unset(&override_to_key(branch))?;
    repo.config_unset(&override_while_descendant_of_key(branch))?;
    Ok(())
}

/// Upstream discovery: the local branch whose filtered reflog
/// first contains a commit from `branch`'s own log, restricted by
/// `condition` (e.g. "is a managed branch" or "is not `branch` itself").
pub fn infer_upstream(
    repo: &Repository,
    index: &ReflogIndex,
    branch: &LocalBranchShortName,
    condition: impl Fn(&LocalBranchShortName) -> bool,
) -> anyhow::Result<Option<LocalBranchShortName>> {
    let Some((_, containing)) = index.match_log(repo, branch)? else {
        return Ok(None);
    };
    for pair in containing {
        if condition(&pair.local) {
            return Ok(Some(pair.local));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_keys_follow_spec_naming() {
        let b = LocalBranchShortName::new("feature/a").unwrap();
        assert_eq!(override_to_key(&b), "machete.overrideForkPoint.feature/a.to");
        assert_eq!(
            override_while_descendant_of_key(&b),
            "machete.overrideForkPoint.feature/a.whileDescendantOf"
        );
    }
}
