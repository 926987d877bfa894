//! Rendering the in-memory layout back to text, and persisting it to disk.

use std::path::{Path, PathBuf};

use super::Layout;
use crate::branch::LocalBranchShortName;
use crate::git::Repository;

impl Layout {
    /// Serialize via DFS: `indent*depth + branch + (" " + annotation)?`.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.managed.len());
        for root in &self.roots {
            self.render_dfs(root, 0, &mut lines);
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn render_dfs(&self, branch: &LocalBranchShortName, depth: usize, lines: &mut Vec<String>) {
        let annotation = self
            .annotations
            .get(branch)
            .map(|a| a.unformatted_full_text())
            .filter(|s| !s.is_empty())
            .map(|s| format!(" {s}"))
            .unwrap_or_default();
        lines.push(format!("{}{branch}{annotation}", self.indent.repeat(depth)));
        for child in self.children_of(branch) {
            self.render_dfs(child, depth + 1, lines);
        }
    }
}

/// The path to the branch-layout file for `repo`: inside the git directory,
/// defaulting to the shared top-level directory unless
/// `machete.worktree.useTopLevelMacheteFile=false`.
pub fn machete_file_path(repo: &Repository, use_top_level: bool) -> anyhow::Result<PathBuf> {
    let dir = if use_top_level { repo.common_dir()? } else { repo.git_dir()? };
    Ok(dir.join("machete"))
}

/// Write `contents` to `path`, optionally backing up the previous contents
/// to `<path>~` first (`discover` does; most other mutating operations
/// don't).
pub fn save(path: &Path, contents: &str, backup: bool) -> anyhow::Result<()> {
    if backup && path.exists() {
        std::fs::copy(path, backup_path(path))?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push("~");
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::parse;

    #[test]
    fn render_roundtrips_parse() {
        let text = "develop\n  feature/a\n    feature/a1\n  feature/b\nmaster\n";
        let outcome = parse(Path::new("machete"), text, None).unwrap();
        assert_eq!(outcome.layout.render(), text);
    }

    #[test]
    fn render_includes_annotation() {
        let text = "develop\n  feature/a PR #42 rebase=no\n";
        let outcome = parse(Path::new("machete"), text, None).unwrap();
        assert_eq!(outcome.layout.render(), text);
    }
}
