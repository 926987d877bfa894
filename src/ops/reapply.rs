//! `reapply`: interactive rebase of the current branch onto its
//! own fork point, to clean up/reorder its own commits without touching the
//! parent relationship.

use crate::error::MacheteError;

use super::Session;

impl Session {
    pub fn reapply(&mut self, fork_point_override: Option<&str>) -> anyhow::Result<()> {
        let current = self
            .repo
            .require_current_branch("reapply")
            .and_then(crate::branch::LocalBranchShortName::new)?;

        let fork_point = match fork_point_override {
            Some(fp) => self
                .repo
                .resolve_commit_hash(fp)?
                .ok_or_else(|| MacheteError::user_input(format!("`{fp}` does not resolve to a commit")))?,
            None => {
                let index = self.reflog_index()?;
                self.fork_point_of(&index, &current)?
            }
        };

        let current_hash = self
            .repo
            .resolve_commit_hash(current.as_str())?
            .ok_or_else(|| MacheteError::internal(format!("{current} has no commits")))?;
        self.rebase_with_hook(&current, &current_hash, &fork_point)?;
        println!("{current} was reapplied onto its own history starting at {fork_point}");
        Ok(())
    }
}
