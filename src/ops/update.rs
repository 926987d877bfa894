//! `update`: bring the current branch in sync with its parent,
//! either by rebasing onto `(fork-point → parent tip)` or by merging the
//! parent in.

use crate::error::MacheteError;

use super::Session;

impl Session {
    pub fn update(&mut self, merge: bool, fork_point_override: Option<&str>) -> anyhow::Result<()> {
        let current = self
            .repo
            .require_current_branch("update")
            .and_then(crate::branch::LocalBranchShortName::new)?;
        let parent = self.require_parent(&current)?;
        let parent_full = parent.to_full().as_str().to_string();

        if merge {
            self.repo.merge(&parent_full, &format!("Merge branch '{parent}' into {current}"), false)?;
        } else {
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
            self.rebase_with_hook(&current, &parent_full, &fork_point)?;
        }
        println!("{current} is now up to date with {parent}");
        Ok(())
    }
}
