//! History queries: ancestry, merge-base, commit enumeration, patch
//! equivalence.

use super::Repository;

/// One commit as enumerated between two revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub full_hash: String,
    pub short_hash: String,
    pub subject: String,
}

impl Repository {
    /// Is `ancestor` an ancestor of `descendant`, or equal to it?
    pub fn is_ancestor_or_equal(&self, ancestor: &str, descendant: &str) -> anyhow::Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        self.run_check(&["merge-base", "--is-ancestor", ancestor, descendant])
    }

    /// The best common ancestor of `a` and `b`, or `None` if there is none
    /// (unrelated histories).
    pub fn merge_base(&self, a: &str, b: &str) -> anyhow::Result<Option<String>> {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if let Some(cached) = self.cache.borrow().merge_base.get(&key).cloned() {
            return Ok(cached);
        }
        let output = self.run_raw(&["merge-base", a, b])?;
        let result = if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        };
        self.cache.borrow_mut().merge_base.insert(key, result.clone());
        Ok(result)
    }

    /// Commits reachable from `to` but not from `from`, oldest first
    /// (matching the order the fork-point engine and `squash` walk them in).
    pub fn commits_between(&self, from: &str, to: &str) -> anyhow::Result<Vec<CommitInfo>> {
        let out = self.run(&[
            "log",
            "--reverse",
            "--format=%H%x01%h%x01%s",
            &format!("{from}..{to}"),
        ])?;
        Ok(out
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(3, '\u{1}');
                Some(CommitInfo {
                    full_hash: parts.next()?.to_string(),
                    short_hash: parts.next()?.to_string(),
                    subject: parts.next().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    /// `git patch-id` of the diff of a single commit against its first
    /// parent.
    pub fn patch_id_of_commit(&self, commit: &str) -> anyhow::Result<Option<String>> {
        self.patch_id_of_diff(&format!("{commit}~1"), commit)
    }

    /// `git patch-id` of the diff between two revisions (used by `exact`
    /// squash-merge detection to compare a candidate squash commit's diff
    /// against the union of the branch's own commits).
    pub fn patch_id_of_diff(&self, from: &str, to: &str) -> anyhow::Result<Option<String>> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let diff = Command::new("git")
            .args(["diff", from, to])
            .current_dir(self.discovery_path())
            .output()?;
        if !diff.status.success() || diff.stdout.is_empty() {
            return Ok(None);
        }

        let mut patch_id = Command::new("git")
            .args(["patch-id", "--stable"])
            .current_dir(self.discovery_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        patch_id
            .stdin
            .take()
            .expect("stdin was piped")
            .write_all(&diff.stdout)?;
        let output = patch_id.wait_with_output()?;
        let id = String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .next()
            .map(str::to_string);
        Ok(id)
    }

    /// The combined patch-id of a commit range, computed the way `exact`
    /// squash-merge detection needs it: patch-id of the cumulative diff
    /// `from..to`, which is comparable to a single squash commit's patch-id
    /// when the two represent the same net change.
    pub fn patch_id_of_range(&self, from: &str, to: &str) -> anyhow::Result<Option<String>> {
        self.patch_id_of_diff(from, to)
    }

    /// Subject line of a single commit, used to print the fork-point commit
    /// itself in `--list-commits` output (outside any `from..to` range).
    pub fn commit_subject(&self, commit: &str) -> anyhow::Result<Option<String>> {
        let output = self.run_raw(&["log", "-1", "--format=%s", commit])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    /// Short hash of a single commit.
    pub fn short_hash(&self, commit: &str) -> anyhow::Result<Option<String>> {
        let output = self.run_raw(&["log", "-1", "--format=%h", commit])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }
}
