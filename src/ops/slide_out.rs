//! `slide-out` / `slide-out-removed-from-remote`.

use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;

use super::Session;

impl Session {
    /// `slide-out(branches…)`: `branches` must form a chain where each is the
    /// unique child of the previous. The descendants of the last branch are
    /// reparented onto the first branch's parent, then each is rebased (or
    /// merged, with `merge`) onto that new parent.
    pub fn slide_out(&mut self, branches: &[LocalBranchShortName], merge: bool) -> anyhow::Result<()> {
        if branches.is_empty() {
            return Err(MacheteError::user_input("slide-out requires at least one branch").into());
        }
        for b in branches {
            self.require_managed(b)?;
        }
        for pair in branches.windows(2) {
            let children = self.layout.children_of(&pair[0]);
            if children.len() != 1 || children[0] != pair[1] {
                return Err(MacheteError::user_input(format!(
                    "{} is not the unique child of {} — slide-out requires an unambiguous chain",
                    pair[1], pair[0]
                ))
                .into());
            }
        }

        let first = &branches[0];
        let last = branches.last().expect("non-empty, checked above");
        let new_parent = self.layout.parent_of(first).cloned();
        let descendants: Vec<LocalBranchShortName> = self.layout.children_of(last).to_vec();

        for branch in branches {
            if !self.layout.annotations.get(branch).map(|a| a.qualifiers.slide_out).unwrap_or(true) {
                return Err(MacheteError::user_input(format!("{branch} has slide-out=no and cannot be slid out")).into());
            }
        }

        for branch in branches {
            self.layout.slide_out(branch);
        }

        for descendant in &descendants {
            if let Some(parent) = new_parent.clone() {
                self.layout.reparent(descendant, parent.clone(), false);
                let index = self.reflog_index()?;
                let fork_point = crate::forkpoint::fork_point(&self.repo, &index, descendant, Some(last), true)?;
                if merge {
                    self.repo.merge(&parent.to_full().as_str().to_string(), &format!("Merge branch '{parent}' into {descendant}"), false)?;
                } else {
                    self.rebase_with_hook(descendant, &parent.to_full().as_str().to_string(), &fork_point)?;
                }
            }
        }

        self.save_layout(false)?;
        crate::hooks::run_post_slide_out(
            &self.repo,
            new_parent.as_ref().unwrap_or(first),
            last,
            &descendants,
        )?;
        println!("Slid out: {}", branches.iter().map(LocalBranchShortName::to_string).collect::<Vec<_>>().join(", "));
        Ok(())
    }

    /// Slide out every managed branch whose tracking counterpart no longer
    /// exists on its remote.
    pub fn slide_out_removed_from_remote(&mut self) -> anyhow::Result<()> {
        let mut to_remove = Vec::new();
        for branch in self.layout.managed.clone() {
            let had_tracking = self.repo.combined_tracking_counterpart(branch.as_str())?.is_some();
            let has_remote_ref = self.repo.strict_tracking_counterpart(branch.as_str())?.is_some();
            if had_tracking && !has_remote_ref {
                to_remove.push(branch);
            }
        }
        for branch in &to_remove {
            self.slide_out(std::slice::from_ref(branch), false)?;
        }
        if to_remove.is_empty() {
            println!("No branches to slide out");
        }
        Ok(())
    }
}
