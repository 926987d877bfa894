//! Raw reflog access: every entry for a ref or branch (full hash + subject).
//! Filtering the entries down to the ones the fork-point engine trusts is
//! [`crate::forkpoint`]'s job, not the gateway's — the gateway only fetches.

use super::Repository;

/// One reflog entry for a ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub hash: String,
    pub subject: String,
}

impl Repository {
    /// The full reflog of `refname` (a local branch short name, or
    /// `<remote>/<branch>` for a remote-tracking branch), oldest first.
    ///
    /// Returns an empty vec if the ref has no reflog (e.g. a remote branch
    /// whose reflog was never enabled, or a branch just created).
    pub fn reflog(&self, refname: &str) -> anyhow::Result<Vec<ReflogEntry>> {
        let output = self.run_raw(&["reflog", "show", "--format=%H%x01%gs", refname])?;
        if !output.status.success() {
            return Ok(Vec::new());
        }
        let out = String::from_utf8_lossy(&output.stdout);
        let mut entries: Vec<ReflogEntry> = out
            .lines()
            .filter_map(|line| {
                let (hash, subject) = line.split_once('\u{1}')?;
                Some(ReflogEntry {
                    hash: hash.to_string(),
                    subject: subject.to_string(),
                })
            })
            .collect();
        entries.reverse(); // git prints newest-first; callers want oldest-first
        Ok(entries)
    }
}
