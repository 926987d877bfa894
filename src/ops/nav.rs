//! `go` / `show`: navigation over the forest.

use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;

use super::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Next,
    Prev,
    First,
    Last,
    Root,
    Current,
}

impl Session {
    /// Resolve `direction` relative to the current branch, returning the
    /// target. `down` with more than one child prompts the user to pick one
    /// unless `--yes` is set, in which case the first child wins.
    pub fn resolve_direction(&self, direction: Direction) -> anyhow::Result<LocalBranchShortName> {
        let current = self
            .repo
            .require_current_branch("navigate")
            .and_then(LocalBranchShortName::new)?;

        Ok(match direction {
            Direction::Current => current,
            Direction::Up => self.require_parent(&current)?,
            Direction::Root => self.root_branch_for(&current, true)?,
            Direction::Down => {
                let children = self.layout.children_of(&current);
                match children.len() {
                    0 => return Err(MacheteError::user_input(format!("{current} has no children")).into()),
                    1 => children[0].clone(),
                    _ => self.pick(children, "multiple children")?,
                }
            }
            Direction::First => {
                let root = self.root_branch_for(&current, true)?;
                self.layout
                    .children_of(&root)
                    .first()
                    .cloned()
                    .unwrap_or(root)
            }
            Direction::Last => {
                let mut b = self.root_branch_for(&current, false)?;
                loop {
                    match self.layout.children_of(&b).last() {
                        Some(child) => b = child.clone(),
                        None => break b,
                    }
                }
            }
            Direction::Next | Direction::Prev => {
                let pos = self
                    .layout
                    .managed
                    .iter()
                    .position(|b| b == &current)
                    .ok_or_else(|| MacheteError::user_input(format!("{current} is not managed")))?;
                let target = if direction == Direction::Next { pos + 1 } else { pos.checked_sub(1).ok_or_else(|| MacheteError::user_input("already at the first managed branch"))? };
                self.layout
                    .managed
                    .get(target)
                    .cloned()
                    .ok_or_else(|| MacheteError::user_input("no successor; nothing left to update"))?
            }
        })
    }

    /// Root of `branch`'s tree: walks the parent chain if `branch` is
    /// managed; if it isn't, falls back to the first (or, with
    /// `pick_first = false`, last) configured layout root and warns, rather
    /// than failing outright.
    fn root_branch_for(&self, branch: &LocalBranchShortName, pick_first: bool) -> anyhow::Result<LocalBranchShortName> {
        if self.layout.is_managed(branch) {
            let mut b = branch.clone();
            while let Some(p) = self.layout.parent_of(&b) {
                b = p.clone();
            }
            return Ok(b);
        }
        let root = if pick_first { self.layout.roots.first() } else { self.layout.roots.last() }
            .ok_or_else(|| MacheteError::user_input("the branch layout has no roots"))?;
        crate::warn::warn(format!(
            "{branch} is not a managed branch, assuming {root} (the {} root) instead",
            if pick_first { "first" } else { "last" }
        ));
        Ok(root.clone())
    }

    fn pick(&self, options: &[LocalBranchShortName], context: &str) -> anyhow::Result<LocalBranchShortName> {
        if self.assume_yes {
            return Ok(options[0].clone());
        }
        println!("{context}, pick one:");
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        print!("> ");
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let index: usize = line.trim().parse().map_err(|_| MacheteError::user_input("expected a number"))?;
        options
            .get(index.saturating_sub(1))
            .cloned()
            .ok_or_else(|| MacheteError::user_input("selection out of range").into())
    }

    pub fn go(&self, direction: Direction) -> anyhow::Result<()> {
        let target = self.resolve_direction(direction)?;
        self.repo.checkout(target.as_str())?;
        println!("{target}");
        Ok(())
    }

    pub fn show(&self, direction: Direction) -> anyhow::Result<()> {
        println!("{}", self.resolve_direction(direction)?);
        Ok(())
    }
}
