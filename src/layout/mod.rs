//! Branch-layout store.
//!
//! An in-memory forest (`roots` + parent/children maps, in file order) plus the
//! free-text `Annotation` for each branch, read once at startup, mutated by
//! operations, and flushed back to disk.

mod parse;
mod render;

pub use parse::{ParseOutcome, parse};
pub use render::{machete_file_path, save};

use indexmap::{IndexMap, IndexSet};

use crate::annotation::Annotation;
use crate::branch::LocalBranchShortName;

/// The branch-layout forest.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Pre-order traversal of the forest — invariant I1.
    pub managed: Vec<LocalBranchShortName>,
    /// Roots, in file order.
    pub roots: Vec<LocalBranchShortName>,
    parent: IndexMap<LocalBranchShortName, LocalBranchShortName>,
    children: IndexMap<LocalBranchShortName, Vec<LocalBranchShortName>>,
    pub annotations: IndexMap<LocalBranchShortName, Annotation>,
    /// The indentation unit detected while parsing (or configured as
    /// default), used when re-rendering.
    pub indent: String,
}

impl Layout {
    pub fn empty() -> Self {
        Layout {
            indent: "  ".to_string(),
            ..Default::default()
        }
    }

    pub fn is_managed(&self, branch: &LocalBranchShortName) -> bool {
        self.parent.contains_key(branch) || self.roots.contains(branch)
    }

    pub fn parent_of(&self, branch: &LocalBranchShortName) -> Option<&LocalBranchShortName> {
        self.parent.get(branch)
    }

    pub fn children_of(&self, branch: &LocalBranchShortName) -> &[LocalBranchShortName] {
        self.children.get(branch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_root(&self, branch: &LocalBranchShortName) -> bool {
        self.roots.contains(branch)
    }

    pub fn is_childless(&self, branch: &LocalBranchShortName) -> bool {
        self.children_of(branch).is_empty()
    }

    /// Branches with no children among the managed set — candidates `go
    /// down` has nowhere further to descend from.
    pub fn childless_managed_branches(&self) -> Vec<LocalBranchShortName> {
        self.managed.iter().filter(|b| self.is_childless(b)).cloned().collect()
    }

    fn recompute_managed(&mut self) {
        let mut order = Vec::with_capacity(self.managed.len());
        fn walk(
            branch: &LocalBranchShortName,
            children: &IndexMap<LocalBranchShortName, Vec<LocalBranchShortName>>,
            order: &mut Vec<LocalBranchShortName>,
        ) {
            order.push(branch.clone());
            for child in children.get(branch).map(Vec::as_slice).unwrap_or(&[]) {
                walk(child, children, order);
            }
        }
        for root in &self.roots {
            walk(root, &self.children, &mut order);
        }
        self.managed = order;
    }

    /// Attach `branch` as a new root, or as the first/last child of `onto`.
    pub fn add_branch(
        &mut self,
        branch: LocalBranchShortName,
        onto: Option<LocalBranchShortName>,
        as_first_child: bool,
    ) {
        match onto {
            None => self.roots.push(branch.clone()),
            Some(parent) => {
                self.parent.insert(branch.clone(), parent.clone());
                let siblings = self.children.entry(parent).or_default();
                if as_first_child {
                    siblings.insert(0, branch.clone());
                } else {
                    siblings.push(branch.clone());
                }
            }
        }
        self.recompute_managed();
    }

    /// Remove `branch` from the layout, reparenting its children to
    /// `branch`'s former parent (or promoting them to roots at `branch`'s
    /// position), preserving child order.
    pub fn slide_out(&mut self, branch: &LocalBranchShortName) {
        let children = self.children.shift_remove(branch).unwrap_or_default();
        self.annotations.shift_remove(branch);

        match self.parent.shift_remove(branch) {
            Some(parent) => {
                let siblings = self.children.entry(parent.clone()).or_default();
                let pos = siblings.iter().position(|b| b == branch).unwrap_or(siblings.len());
                siblings.remove(pos);
                for (offset, child) in children.into_iter().enumerate() {
                    self.parent.insert(child.clone(), parent.clone());
                    siblings.insert(pos + offset, child);
                }
            }
            None => {
                let pos = self.roots.iter().position(|b| b == branch).unwrap_or(self.roots.len());
                self.roots.remove(pos);
                for (offset, child) in children.into_iter().enumerate() {
                    self.parent.shift_remove(&child);
                    self.roots.insert(pos + offset, child);
                }
            }
        }
        self.recompute_managed();
    }

    /// Slide out every branch in `invalid`, in an order that is safe
    /// regardless of ancestor/descendant relationships among them, matching
    /// `read_branch_layout_file`'s `recursive_slide_out_invalid_branches`.
    pub fn slide_out_all(&mut self, invalid: &IndexSet<LocalBranchShortName>) {
        // Deepest first, so a branch's parent pointer is still the original
        // one (not an already-reparented stand-in) when we process it.
        let mut remaining: Vec<LocalBranchShortName> = invalid.iter().cloned().collect();
        remaining.sort_by_key(|b| std::cmp::Reverse(self.depth_of(b)));
        for branch in remaining {
            self.slide_out(&branch);
        }
    }

    fn depth_of(&self, branch: &LocalBranchShortName) -> usize {
        let mut depth = 0;
        let mut current = branch.clone();
        while let Some(parent) = self.parent.get(&current) {
            depth += 1;
            current = parent.clone();
        }
        depth
    }

    /// Reparent `child` under `new_parent`, detaching it from wherever it
    /// currently sits (used by `advance`/`slide-out` of a *valid*,
    /// still-tracked branch rather than an invalid one).
    pub fn reparent(&mut self, child: &LocalBranchShortName, new_parent: LocalBranchShortName, as_first_child: bool) {
        if let Some(old_parent) = self.parent.get(child).cloned() {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|b| b != child);
            }
        } else {
            self.roots.retain(|b| b != child);
        }
        self.parent.insert(child.clone(), new_parent.clone());
        let siblings = self.children.entry(new_parent).or_default();
        if as_first_child {
            siblings.insert(0, child.clone());
        } else {
            siblings.push(child.clone());
        }
        self.recompute_managed();
    }
}
