//! `anno`: set, clear, or display a branch's
//! annotation; `--sync-prs` (alias `--sync-github-prs`, `-H`) synchronizes
//! annotations to PR/MR numbers for both supported providers.

use crate::annotation::Annotation;
use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;
use crate::hosting::CodeHostingClient;

use super::Session;

impl Session {
    pub fn anno_show(&self, branch: &LocalBranchShortName) -> anyhow::Result<()> {
        self.require_managed(branch)?;
        match self.layout.annotations.get(branch) {
            Some(a) => println!("{}", a.unformatted_full_text()),
            None => println!(),
        }
        Ok(())
    }

    pub fn anno_set(&mut self, branch: &LocalBranchShortName, text: &str) -> anyhow::Result<()> {
        self.require_managed(branch)?;
        if text.is_empty() {
            self.layout.annotations.shift_remove(branch);
        } else {
            self.layout.annotations.insert(branch.clone(), Annotation::parse(text));
        }
        self.save_layout(false)
    }

    /// Walk every managed branch with a tracked remote and set/refresh its
    /// annotation to `PR #<n>` (or `MR !<n>` for GitLab) based on the single
    /// open PR/MR whose head is that branch, if any.
    pub fn anno_sync_prs(&mut self, client: &dyn CodeHostingClient) -> anyhow::Result<()> {
        for branch in self.layout.managed.clone() {
            let matches = client.list_by_head(branch.as_str())?;
            match matches.len() {
                0 => continue,
                1 => {
                    let pr = &matches[0];
                    let label = client.ref_label(pr.number);
                    let existing_text = self
                        .layout
                        .annotations
                        .get(&branch)
                        .map(|a| a.text_without_qualifiers.clone())
                        .unwrap_or_default();
                    let new_text = if existing_text.is_empty() || existing_text.starts_with("PR #") || existing_text.starts_with("MR !") {
                        label
                    } else {
                        existing_text
                    };
                    let qualifiers_suffix = self
                        .layout
                        .annotations
                        .get(&branch)
                        .filter(|a| a.qualifiers.is_non_default())
                        .map(|a| format!(" {}", a.qualifiers))
                        .unwrap_or_default();
                    self.layout
                        .annotations
                        .insert(branch.clone(), Annotation::parse(&format!("{new_text}{qualifiers_suffix}")));
                }
                _ => {
                    return Err(MacheteError::user_input(format!("{branch} has more than one open PR/MR with it as head")).into());
                }
            }
        }
        self.save_layout(false)
    }
}
