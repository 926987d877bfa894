//! `add`: attach an existing or yet-to-be-created branch to the
//! layout.

use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;

use super::Session;

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub onto: Option<LocalBranchShortName>,
    pub as_root: bool,
    pub as_first_child: bool,
    pub switch_head: bool,
}

impl Session {
    pub fn add(&mut self, branch: LocalBranchShortName, options: AddOptions) -> anyhow::Result<()> {
        if self.layout.is_managed(&branch) {
            return Err(MacheteError::user_input(format!("branch {branch} is already managed")).into());
        }

        let local_exists = self.repo.local_branches()?.iter().any(|b| b == branch.as_str());
        if !local_exists {
            self.create_missing_branch(&branch, options.onto.as_ref())?;
        } else if options.switch_head {
            self.repo.checkout(branch.as_str())?;
        }

        let parent = if options.as_root {
            None
        } else if let Some(onto) = options.onto.clone() {
            self.require_managed(&onto)?;
            Some(onto)
        } else {
            let index = self.reflog_index()?;
            crate::forkpoint::infer_upstream(&self.repo, &index, &branch, |candidate| self.layout.is_managed(candidate))?
        };

        self.layout.add_branch(branch.clone(), parent.clone(), options.as_first_child);
        self.save_layout(false)?;
        match parent {
            Some(p) => println!("Added branch {branch} onto {p}"),
            None => println!("Added branch {branch} as a new root"),
        }
        Ok(())
    }

    fn create_missing_branch(&self, branch: &LocalBranchShortName, onto: Option<&LocalBranchShortName>) -> anyhow::Result<()> {
        let remote_matches: Vec<String> = self
            .repo
            .remote_branches()?
            .into_iter()
            .filter(|r| r.rsplit_once('/').map(|(_, b)| b) == Some(branch.as_str()))
            .collect();

        if remote_matches.len() == 1 {
            let remote = &remote_matches[0];
            if self.confirm(&format!("Branch {branch} not found locally, but exists as {remote} — check it out?"))? {
                self.repo.run_mutating(&["checkout", "-b", branch.as_str(), "--track", remote])?;
                return Ok(());
            }
        }

        let start_point = onto.map(|o| o.as_str().to_string()).unwrap_or_else(|| "HEAD".to_string());
        if self.confirm(&format!("Branch {branch} does not exist — create it from {start_point}?"))? {
            self.repo.create_branch(branch.as_str(), &start_point, false)?;
            Ok(())
        } else {
            Err(MacheteError::user_input(format!("branch {branch} does not exist")).into())
        }
    }
}
