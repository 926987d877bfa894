//! `advance`: fast-forward the current branch to its unique
//! green-edge (in-sync) child, optionally push, optionally slide the child
//! out.

use crate::error::MacheteError;
use crate::sync_status::EdgeStatus;

use super::Session;

impl Session {
    pub fn advance(&mut self, push: bool, slide_out_child: bool) -> anyhow::Result<()> {
        let current = self
            .repo
            .require_current_branch("advance")
            .and_then(crate::branch::LocalBranchShortName::new)?;
        self.require_managed(&current)?;

        let index = self.reflog_index()?;
        let mut candidates = Vec::new();
        for child in self.layout.children_of(&current).to_vec() {
            let status = crate::sync_status::classify_edge(&self.repo, &index, &child, &current, true, self.settings.squash_merge_detection)?;
            if status == EdgeStatus::InSync {
                candidates.push(child);
            }
        }

        let child = match candidates.len() {
            0 => return Err(MacheteError::git_state(format!("{current} has no child in sync with it to advance to"), None).into()),
            1 => candidates.remove(0),
            _ => {
                return Err(MacheteError::user_input(format!(
                    "{current} has multiple children in sync with it; advance requires exactly one"
                ))
                .into());
            }
        };

        if !self.confirm(&format!("Fast-forward {current} to match {child}?"))? {
            return Ok(());
        }
        self.repo.merge_ff_only(&child.to_full().as_str().to_string())?;
        println!("{current} is now at {child}");

        if push {
            if let Some(remote) = self.repo.strict_tracking_counterpart(current.as_str())?.and_then(|c| c.split_once('/').map(|(r, _)| r.to_string())) {
                self.repo.push(&remote, current.as_str(), false)?;
            }
        }

        if slide_out_child && self.confirm(&format!("Slide {child} out?"))? {
            self.slide_out(std::slice::from_ref(&child), false)?;
        }
        Ok(())
    }
}
