//! Git config read/write.
//!
//! Raw `machete.*` key access. [`crate::config`] builds the typed settings
//! snapshot on top of this.

use super::Repository;

impl Repository {
    pub fn config_get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let output = self.run_raw(&["config", "--get", key])?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    pub fn config_set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.run_mutating(&["config", "--local", key, value])?;
        Ok(())
    }

    pub fn config_unset(&self, key: &str) -> anyhow::Result<()> {
        let output = self.run_raw(&["config", "--unset", key])?;
        // exit 5 = key didn't exist; treat as success (unset is idempotent)
        if output.status.success() || output.status.code() == Some(5) {
            self.invalidate();
            Ok(())
        } else {
            anyhow::bail!(
                "git config --unset {key} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )
        }
    }

    /// All `machete.*` keys and values, for `anno --sync-prs`-style bulk
    /// inspection and for `discover`'s config-driven root/domain hints.
    pub fn config_list_prefixed(&self, prefix: &str) -> anyhow::Result<Vec<(String, String)>> {
        let output = self.run_raw(&["config", "--get-regexp", &format!("^{}", regex::escape(prefix))])?;
        if !output.status.success() {
            return Ok(Vec::new());
        }
        let out = String::from_utf8_lossy(&output.stdout);
        Ok(out
            .lines()
            .filter_map(|line| line.split_once(' '))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}
