//! Refs and branches.

use super::Repository;

impl Repository {
    /// All local branch short names, in `git for-each-ref`'s natural order.
    pub fn local_branches(&self) -> anyhow::Result<Vec<String>> {
        if let Some(cached) = self.cache.borrow().local_branches.clone() {
            return Ok(cached);
        }
        let out = self.run(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
        let branches: Vec<String> = out.lines().map(str::to_string).collect();
        self.cache.borrow_mut().local_branches = Some(branches.clone());
        Ok(branches)
    }

    /// All remote-tracking branch short names (`<remote>/<branch>`), across
    /// every configured remote.
    pub fn remote_branches(&self) -> anyhow::Result<Vec<String>> {
        if let Some(cached) = self.cache.borrow().remote_branches.clone() {
            return Ok(cached);
        }
        let out = self.run(&["for-each-ref", "--format=%(refname:short)", "refs/remotes/"])?;
        let branches: Vec<String> = out
            .lines()
            .filter(|l| !l.ends_with("/HEAD"))
            .map(str::to_string)
            .collect();
        self.cache.borrow_mut().remote_branches = Some(branches.clone());
        Ok(branches)
    }

    /// `<short>` -> `refs/heads/<short>` (purely lexical, no existence check).
    pub fn local_branch_full_name(short: &str) -> String {
        format!("refs/heads/{short}")
    }

    /// `refs/heads/<short>` -> `<short>` (purely lexical).
    pub fn local_branch_short_name(full: &str) -> Option<&str> {
        full.strip_prefix("refs/heads/")
    }

    /// Resolve any revision expression to its full 40-hex commit hash.
    pub fn resolve_commit_hash(&self, revision: &str) -> anyhow::Result<Option<String>> {
        if let Some(cached) = self.cache.borrow().commit_hash.get(revision).cloned() {
            return Ok(cached);
        }
        let output = self.run_raw(&["rev-parse", "--verify", "-q", &format!("{revision}^{{commit}}")])?;
        let result = if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        };
        self.cache
            .borrow_mut()
            .commit_hash
            .insert(revision.to_string(), result.clone());
        Ok(result)
    }

    /// Resolve a revision to the hash of the tree it points at.
    pub fn resolve_tree_hash(&self, revision: &str) -> anyhow::Result<Option<String>> {
        if let Some(cached) = self.cache.borrow().tree_hash.get(revision).cloned() {
            return Ok(cached);
        }
        let output = self.run_raw(&["rev-parse", "--verify", "-q", &format!("{revision}^{{tree}}")])?;
        let result = if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        };
        self.cache
            .borrow_mut()
            .tree_hash
            .insert(revision.to_string(), result.clone());
        Ok(result)
    }

    /// Committer Unix timestamp of `revision`'s tip commit.
    pub fn committer_timestamp(&self, revision: &str) -> anyhow::Result<Option<i64>> {
        if let Some(cached) = self.cache.borrow().committer_timestamp.get(revision).cloned() {
            return Ok(cached);
        }
        let output = self.run_raw(&["log", "-1", "--format=%ct", revision, "--"])?;
        let result = if output.status.success() {
            String::from_utf8_lossy(&output.stdout).trim().parse::<i64>().ok()
        } else {
            None
        };
        self.cache
            .borrow_mut()
            .committer_timestamp
            .insert(revision.to_string(), result);
        Ok(result)
    }

    /// The counterpart set by `branch.<name>.remote`/`.merge`
    /// (`@{u}`/upstream), independent of whether that ref still exists.
    pub fn combined_tracking_counterpart(&self, local: &str) -> anyhow::Result<Option<String>> {
        self.tracking_counterpart(local, "%(upstream:short)")
    }

    /// The counterpart as `git branch -vv`/`--track` reports it strictly
    /// (i.e. only when the remote-tracking ref actually exists).
    pub fn strict_tracking_counterpart(&self, local: &str) -> anyhow::Result<Option<String>> {
        let remote_branches = self.remote_branches()?;
        let combined = self.combined_tracking_counterpart(local)?;
        Ok(combined.filter(|c| remote_branches.contains(c)))
    }

    fn tracking_counterpart(&self, local: &str, format: &str) -> anyhow::Result<Option<String>> {
        let key = format!("{local}\0{format}");
        if let Some(cached) = self.cache.borrow().tracking_counterpart.get(&key).cloned() {
            return Ok(cached);
        }
        let out = self.run(&[
            "for-each-ref",
            &format!("--format={format}"),
            &format!("refs/heads/{local}"),
        ])?;
        let result = (!out.is_empty()).then(|| out.trim().to_string());
        self.cache.borrow_mut().tracking_counterpart.insert(key, result.clone());
        Ok(result)
    }
}
