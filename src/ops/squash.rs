//! `squash`: collapse `(fork-point, HEAD]`
//! into a single commit, authored as the earliest original commit's author,
//! committed as the current user/time, landed via `update-ref` with a
//! `"squash: ..."` reflog subject so later fork-point computations don't
//! mistake it for a `reset:`-class event.

use crate::error::MacheteError;

use super::Session;

impl Session {
    pub fn squash(&mut self, fork_point_override: Option<&str>) -> anyhow::Result<()> {
        let current = self
            .repo
            .require_current_branch("squash")
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

        let current_full = current.to_full().as_str().to_string();
        let commits = self.repo.commits_between(&fork_point, &current_full)?;
        if commits.is_empty() {
            return Err(MacheteError::user_input(format!("no commits to squash on {current} since its fork point")).into());
        }
        if commits.len() == 1 {
            println!("{current} has only one commit since its fork point; nothing to squash");
            return Ok(());
        }

        let earliest = &commits[0];
        let author_name = self.repo.run(&["log", "-1", "--format=%an", &earliest.full_hash])?;
        let author_email = self.repo.run(&["log", "-1", "--format=%ae", &earliest.full_hash])?;
        let author_date = self.repo.run(&["log", "-1", "--format=%ad", "--date=raw", &earliest.full_hash])?;

        let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
        let message = format!("{}\n\n{}", earliest.subject, subjects.join("\n"));

        let tip_tree = self
            .repo
            .resolve_tree_hash(&current_full)?
            .ok_or_else(|| MacheteError::internal(format!("{current} has no tree")))?;

        let env = [
            ("GIT_AUTHOR_NAME", author_name.as_str()),
            ("GIT_AUTHOR_EMAIL", author_email.as_str()),
            ("GIT_AUTHOR_DATE", author_date.as_str()),
        ];
        let squashed = self.repo.commit_tree(&tip_tree, &[&fork_point], &message, &env)?;

        self.repo.update_ref(&current_full, &squashed, &format!("squash: {} commits", commits.len()))?;
        println!("Squashed {} commits on {current} into one", commits.len());
        Ok(())
    }
}
