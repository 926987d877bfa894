//! Remotes.

use super::Repository;

impl Repository {
    pub fn remotes(&self) -> anyhow::Result<Vec<String>> {
        if let Some(cached) = self.cache.borrow().remotes.clone() {
            return Ok(cached);
        }
        let out = self.run(&["remote"])?;
        let remotes: Vec<String> = out.lines().map(str::to_string).collect();
        self.cache.borrow_mut().remotes = Some(remotes.clone());
        Ok(remotes)
    }

    pub fn remote_url(&self, remote: &str) -> anyhow::Result<Option<String>> {
        if let Some(cached) = self.cache.borrow().remote_urls.get(remote).cloned() {
            return Ok(cached);
        }
        let output = self.run_raw(&["remote", "get-url", remote])?;
        let result = if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        };
        self.cache
            .borrow_mut()
            .remote_urls
            .insert(remote.to_string(), result.clone());
        Ok(result)
    }

    /// Fetch `remote`, memoized for the lifetime of this process run: a
    /// given remote is fetched at most once per invocation.
    pub fn fetch_remote(&self, remote: &str) -> anyhow::Result<()> {
        if self.cache.borrow().fetched_remotes.contains_key(remote) {
            return Ok(());
        }
        self.run_mutating(&["fetch", remote])?;
        self.cache.borrow_mut().fetched_remotes.insert(remote.to_string(), ());
        Ok(())
    }

    /// Fetch a single refspec from `remote` (not memoized: used for
    /// targeted, one-off refreshes such as pulling a single branch).
    pub fn fetch_refspec(&self, remote: &str, refspec: &str) -> anyhow::Result<()> {
        self.run_mutating(&["fetch", remote, refspec])?;
        Ok(())
    }

    /// Create the remote-tracking ref for `branch` on `remote` if it
    /// doesn't already exist locally, by fetching it.
    pub fn ensure_remote_branch_exists(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let remote_short = format!("{remote}/{branch}");
        if self.remote_branches()?.contains(&remote_short) {
            return Ok(());
        }
        self.fetch_refspec(remote, &format!("{branch}:refs/remotes/{remote}/{branch}"))
    }
}
