//! `diff` / `log`: delegate to git against the fork-point of the
//! named or current branch.

use crate::branch::LocalBranchShortName;

use super::Session;

impl Session {
    fn target_branch(&self, branch: Option<LocalBranchShortName>) -> anyhow::Result<LocalBranchShortName> {
        match branch {
            Some(b) => Ok(b),
            None => self.repo.require_current_branch("diff/log").and_then(LocalBranchShortName::new),
        }
    }

    pub fn diff(&self, branch: Option<LocalBranchShortName>, stat: bool) -> anyhow::Result<()> {
        let branch = self.target_branch(branch)?;
        let index = self.reflog_index()?;
        let fork_point = self.fork_point_of(&index, &branch)?;
        let mut args = vec!["diff"];
        if stat {
            args.push("--stat");
        }
        let range = format!("{fork_point}..{}", branch.as_str());
        args.push(&range);
        print!("{}", self.repo.run(&args)?);
        Ok(())
    }

    pub fn log(&self, branch: Option<LocalBranchShortName>) -> anyhow::Result<()> {
        let branch = self.target_branch(branch)?;
        let index = self.reflog_index()?;
        let fork_point = self.fork_point_of(&index, &branch)?;
        let range = format!("{fork_point}..{}", branch.as_str());
        print!("{}", self.repo.run(&["log", &range])?);
        Ok(())
    }
}
