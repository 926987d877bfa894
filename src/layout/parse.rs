//! Parsing.

use indexmap::IndexSet;

use super::Layout;
use crate::annotation::Annotation;
use crate::branch::LocalBranchShortName;
use crate::error::MacheteError;

/// Result of a successful parse: the layout (with invalid branches still
/// present — removing them is a separate, policy-driven step) plus the set
/// of branches that don't exist among `existing_local_branches`.
#[derive(Debug)]
pub struct ParseOutcome {
    pub layout: Layout,
    pub invalid_branches: IndexSet<LocalBranchShortName>,
}

/// Parse the branch-layout file's contents.
///
/// `existing_local_branches` is used only to populate `invalid_branches`;
/// when empty (e.g. tests not modeling a real repo), nothing is flagged
/// invalid — pass `None` to skip verification entirely, matching the
/// upstream `verify_branches=False` path used while discovering.
pub fn parse(
    path: &std::path::Path,
    contents: &str,
    existing_local_branches: Option<&[String]>,
) -> anyhow::Result<ParseOutcome> {
    let mut layout = Layout::empty();
    let mut indent: Option<String> = None;
    let mut at_depth: Vec<LocalBranchShortName> = Vec::new();
    let mut last_depth: i64 = -1;
    let mut invalid_branches = IndexSet::new();
    let hint = "Edit the branch layout file manually with `git machete edit`";

    for (index, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim_end();
        if line.is_empty() {
            continue;
        }

        let prefix_len = line.len() - line.trim_start().len();
        let prefix = &line[..prefix_len];
        if !prefix.is_empty() && indent.is_none() {
            indent = Some(prefix.to_string());
        }

        let rest = line.trim_start();
        let (branch_str, annotation_str) = match rest.split_once(' ') {
            Some((b, a)) => (b, Some(a)),
            None => (rest, None),
        };
        let branch = LocalBranchShortName::new(branch_str)
            .map_err(|e| MacheteError::layout_file(path, Some(index + 1), e.to_string()))?;

        if let Some(a) = annotation_str {
            layout.annotations.insert(branch.clone(), Annotation::parse(a));
        }

        if layout.managed.contains(&branch) {
            return Err(MacheteError::layout_file(
                path,
                Some(index + 1),
                format!("branch {branch} re-appears in the branch layout. {hint}"),
            )
            .into());
        }

        if let Some(existing) = existing_local_branches {
            if !existing.iter().any(|b| b == branch.as_str()) {
                invalid_branches.insert(branch.clone());
            }
        }
        layout.managed.push(branch.clone());

        let depth: i64 = if prefix.is_empty() {
            0
        } else {
            let unit = indent.as_ref().expect("set above when prefix is non-empty");
            if prefix.len() % unit.len() != 0 || prefix != unit.repeat(prefix.len() / unit.len()) {
                let expand = |s: &str| {
                    s.chars()
                        .map(|c| if c == '\t' { "<TAB>" } else { "<SPACE>" })
                        .collect::<String>()
                };
                return Err(MacheteError::layout_file(
                    path,
                    Some(index + 1),
                    format!(
                        "invalid indent {}, expected a multiple of {}. {hint}",
                        expand(prefix),
                        expand(unit)
                    ),
                )
                .into());
            }
            (prefix.len() / unit.len()) as i64
        };

        if depth > last_depth + 1 {
            return Err(MacheteError::layout_file(
                path,
                Some(index + 1),
                format!(
                    "too much indent (level {depth}, expected at most {}) for the branch {branch}. {hint}",
                    last_depth + 1
                ),
            )
            .into());
        }
        last_depth = depth;

        at_depth.truncate(depth as usize);
        at_depth.push(branch.clone());

        if depth > 0 {
            let parent = at_depth[(depth - 1) as usize].clone();
            layout.parent.insert(branch.clone(), parent.clone());
            layout.children.entry(parent).or_default().push(branch);
        } else {
            layout.roots.push(branch);
        }
    }

    layout.indent = indent.unwrap_or_else(|| "  ".to_string());
    Ok(ParseOutcome { layout, invalid_branches })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_simple_forest() {
        let text = "develop\n  feature/a\n    feature/a1\n  feature/b\nmaster\n";
        let existing = branches(&["develop", "feature/a", "feature/a1", "feature/b", "master"]);
        let outcome = parse(std::path::Path::new("machete"), text, Some(&existing)).unwrap();
        assert!(outcome.invalid_branches.is_empty());
        assert_eq!(
            outcome.layout.managed.iter().map(|b| b.as_str()).collect::<Vec<_>>(),
            vec!["develop", "feature/a", "feature/a1", "feature/b", "master"]
        );
        assert_eq!(outcome.layout.roots.iter().map(|b| b.as_str()).collect::<Vec<_>>(), vec!["develop", "master"]);
        let a = crate::branch::LocalBranchShortName::new("feature/a").unwrap();
        assert_eq!(
            outcome.layout.children_of(&a).iter().map(|b| b.as_str()).collect::<Vec<_>>(),
            vec!["feature/a1"]
        );
    }

    #[test]
    fn rejects_excessive_indent_jump() {
        let text = "develop\n    feature/a\n";
        let err = parse(std::path::Path::new("machete"), text, None).unwrap_err();
        assert!(err.to_string().contains("too much indent"));
    }

    #[test]
    fn rejects_inconsistent_indent_unit() {
        let text = "develop\n  feature/a\n   feature/b\n";
        let err = parse(std::path::Path::new("machete"), text, None).unwrap_err();
        assert!(err.to_string().contains("invalid indent"));
    }

    #[test]
    fn rejects_duplicate_branch() {
        let text = "develop\n  feature/a\ndevelop\n";
        let err = parse(std::path::Path::new("machete"), text, None).unwrap_err();
        assert!(err.to_string().contains("re-appears"));
    }

    #[test]
    fn flags_branches_missing_locally() {
        let text = "develop\n  feature/gone\n";
        let existing = branches(&["develop"]);
        let outcome = parse(std::path::Path::new("machete"), text, Some(&existing)).unwrap();
        assert_eq!(outcome.invalid_branches.len(), 1);
    }

    #[test]
    fn parses_annotation_after_branch_name() {
        let text = "develop\n  feature/a PR #42 rebase=no\n";
        let outcome = parse(std::path::Path::new("machete"), text, None).unwrap();
        let a = crate::branch::LocalBranchShortName::new("feature/a").unwrap();
        let anno = outcome.layout.annotations.get(&a).unwrap();
        assert_eq!(anno.text_without_qualifiers, "PR #42");
        assert!(!anno.qualifiers.rebase);
    }
}
