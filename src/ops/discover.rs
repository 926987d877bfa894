//! `discover`: synthesize a new
//! layout from local branches, last-checkout recency, and the fork-point
//! engine's upstream-inference mode.

use std::collections::HashMap;

use crate::branch::LocalBranchShortName;
use crate::layout::Layout;

use super::Session;

const DEFAULT_ROOTS: [&str; 3] = ["master", "main", "develop"];
const KEEP_NEWEST: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    pub roots: Vec<LocalBranchShortName>,
    pub checked_out_since: Option<i64>,
    pub yes: bool,
}

/// Minimal union-find for cycle detection while attaching branches to
/// candidate upstreams.
struct UnionFind {
    parent: HashMap<LocalBranchShortName, LocalBranchShortName>,
}

impl UnionFind {
    fn new() -> Self {
        UnionFind { parent: HashMap::new() }
    }

    /// No path compression, so this can be called from a `Fn` (shared-ref)
    /// closure during discovery's upstream-inference pass.
    fn find(&self, b: &LocalBranchShortName) -> LocalBranchShortName {
        let mut current = b.clone();
        let mut seen = std::collections::HashSet::new();
        while let Some(p) = self.parent.get(&current) {
            if p == &current || !seen.insert(current.clone()) {
                break;
            }
            current = p.clone();
        }
        current
    }

    fn union(&mut self, a: &LocalBranchShortName, b: &LocalBranchShortName) {
        let ra = self.find(a);
        self.parent.insert(ra, b.clone());
    }

    fn would_cycle(&self, child: &LocalBranchShortName, candidate_root: &LocalBranchShortName) -> bool {
        self.find(child) == self.find(candidate_root)
    }
}

impl Session {
    pub fn discover(&mut self, options: DiscoverOptions) -> anyhow::Result<()> {
        let local_branches = self.repo.local_branches()?;

        let roots: Vec<LocalBranchShortName> = if !options.roots.is_empty() {
            options.roots.clone()
        } else {
            DEFAULT_ROOTS
                .iter()
                .filter(|r| local_branches.iter().any(|b| b == *r))
                .map(|r| LocalBranchShortName::new(*r))
                .collect::<anyhow::Result<Vec<_>>>()?
        };

        let mut timestamps: Vec<(LocalBranchShortName, i64)> = Vec::new();
        for name in &local_branches {
            let branch = LocalBranchShortName::new(name.clone())?;
            if roots.contains(&branch) {
                continue;
            }
            let ts = self.repo.committer_timestamp(name)?.unwrap_or(0);
            timestamps.push((branch, ts));
        }
        timestamps.sort_by_key(|(_, ts)| *ts);

        let threshold = options.checked_out_since.unwrap_or_else(|| {
            if timestamps.len() > KEEP_NEWEST {
                timestamps[timestamps.len() - KEEP_NEWEST - 1].1
            } else {
                0
            }
        });
        let survivors: Vec<LocalBranchShortName> = timestamps
            .into_iter()
            .filter(|(_, ts)| *ts >= threshold)
            .map(|(b, _)| b)
            .collect();

        let mut layout = Layout::empty();
        for root in &roots {
            layout.roots.push(root.clone());
        }
        let mut uf = UnionFind::new();
        let index = self.reflog_index()?;

        for branch in &survivors {
            let accepted = crate::forkpoint::infer_upstream(&self.repo, &index, branch, |candidate| {
                candidate != branch && (roots.contains(candidate) || layout.is_managed(candidate)) && !uf.would_cycle(branch, candidate)
            })?;

            match accepted {
                Some(upstream) => {
                    layout.add_branch(branch.clone(), Some(upstream.clone()), false);
                    uf.union(branch, &upstream);
                }
                None => {
                    layout.roots.push(branch.clone());
                    layout.managed.push(branch.clone());
                }
            }
        }

        let mut removed = Vec::new();
        for branch in layout.managed.clone() {
            if let Some(parent) = layout.parent_of(&branch).cloned() {
                if layout.is_childless(&branch)
                    && crate::sync_status::is_merged_to(&self.repo, &branch, &parent, self.settings.squash_merge_detection)?
                {
                    removed.push(branch);
                }
            }
        }
        for branch in &removed {
            layout.slide_out(branch);
            crate::warn::warn(format!("{branch} is merged into its parent and has no children; omitted from the discovered layout"));
        }

        let options_render = crate::render::RenderOptions {
            use_overrides: true,
            squash_mode: self.settings.squash_merge_detection,
            list_commits: false,
            extra_space_before_branch_name: self.settings.extra_space_before_branch_name,
        };
        let (rendered, _) = crate::render::render_status(&self.repo, &layout, &options_render)?;
        print!("{rendered}");

        if options.yes || self.confirm("Save the above as the new branch layout?")? {
            self.layout = layout;
            self.save_layout(true)?;
            println!("Branch layout saved");
        }
        Ok(())
    }
}
