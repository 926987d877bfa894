//! PR/MR description intro block.
//!
//! A canonical block delimited by `<!-- start git-machete generated -->` /
//! `<!-- end git-machete generated -->`. Regeneration is idempotent: the
//! block is located by its delimiters and replaced in place; text outside it
//! is preserved. The pre-v3.23 legacy prefix (`# Based on PR #…`) is
//! stripped once if present.

use crate::branch::LocalBranchShortName;
use crate::layout::Layout;

const START: &str = "<!-- start git-machete generated -->";
const END: &str = "<!-- end git-machete generated -->";
const LEGACY_PREFIX_MARKER: &str = "# Based on PR #";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IntroStyle {
    UpOnly,
    #[default]
    Full,
    None,
}

/// Build the chain-listing block for `branch`'s PR, then splice it into
/// `existing_description` between the delimiters (creating them if absent).
pub fn regenerate_intro(
    layout: &Layout,
    branch: &LocalBranchShortName,
    pr_number_of: impl Fn(&LocalBranchShortName) -> Option<u64>,
    style: IntroStyle,
    existing_description: &str,
) -> String {
    let body = match style {
        IntroStyle::None => String::new(),
        IntroStyle::UpOnly => render_chain(upward_chain(layout, branch), branch, &pr_number_of),
        IntroStyle::Full => render_chain(full_tree(layout, branch), branch, &pr_number_of),
    };

    let without_legacy = strip_legacy_prefix(existing_description);
    splice_block(&without_legacy, &body)
}

fn upward_chain(layout: &Layout, branch: &LocalBranchShortName) -> Vec<LocalBranchShortName> {
    let mut chain = vec![branch.clone()];
    let mut current = branch.clone();
    while let Some(parent) = layout.parent_of(&current) {
        chain.push(parent.clone());
        current = parent.clone();
    }
    chain.reverse();
    chain
}

/// The chain from this branch's root down through every descendant reachable
/// by always following the unique path back to `branch` plus its full
/// subtree — approximated here as the upward chain followed by `branch`'s
/// descendants, which is what a PR reviewer cares about.
fn full_tree(layout: &Layout, branch: &LocalBranchShortName) -> Vec<LocalBranchShortName> {
    let mut chain = upward_chain(layout, branch);
    let mut stack = layout.children_of(branch).to_vec();
    while let Some(b) = stack.pop() {
        chain.push(b.clone());
        stack.extend(layout.children_of(&b).iter().cloned());
    }
    chain
}

fn render_chain(chain: Vec<LocalBranchShortName>, current: &LocalBranchShortName, pr_number_of: &impl Fn(&LocalBranchShortName) -> Option<u64>) -> String {
    let mut lines = Vec::new();
    for b in chain {
        let marker = if &b == current { " (THIS ONE)" } else { "" };
        let label = match pr_number_of(&b) {
            Some(n) => format!("#{n} ({b})"),
            None => b.to_string(),
        };
        lines.push(format!("* {label}{marker}"));
    }
    lines.join("\n")
}

fn strip_legacy_prefix(description: &str) -> String {
    match description.find(LEGACY_PREFIX_MARKER) {
        Some(pos) => {
            let after_line_end = description[pos..].find('\n').map(|i| pos + i + 1).unwrap_or(description.len());
            format!("{}{}", &description[..pos], &description[after_line_end..])
        }
        None => description.to_string(),
    }
}

fn splice_block(description: &str, body: &str) -> String {
    let block = format!("{START}\n{body}\n{END}");
    match (description.find(START), description.find(END)) {
        (Some(start), Some(end)) if end > start => {
            let end_of_marker = end + END.len();
            format!("{}{}{}", &description[..start], block, &description[end_of_marker..])
        }
        _ => {
            if description.trim().is_empty() {
                block
            } else {
                format!("{block}\n\n{description}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_creates_block_when_absent() {
        let out = splice_block("original text", "* a\n* b (THIS ONE)");
        assert!(out.contains(START));
        assert!(out.contains("original text"));
    }

    #[test]
    fn splice_replaces_existing_block_idempotently() {
        let first = splice_block("keep me", "* a");
        let second = splice_block(&first, "* a\n* b");
        assert!(second.contains("keep me"));
        assert_eq!(second.matches(START).count(), 1);
        assert!(second.contains("* b"));
    }

    #[test]
    fn legacy_prefix_is_stripped_once() {
        let stripped = strip_legacy_prefix("# Based on PR #12\nbody text");
        assert_eq!(stripped, "body text");
    }
}
