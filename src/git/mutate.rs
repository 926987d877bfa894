//! Mutating operations.
//!
//! The `machete-pre-rebase` hook veto lives above this layer (in
//! [`crate::ops`]): the gateway itself only runs `git` and never prompts or
//! shells out to hooks.

use std::fs;

use super::Repository;

impl Repository {
    pub fn create_branch(&self, name: &str, start_point: &str, switch: bool) -> anyhow::Result<()> {
        if switch {
            self.run_mutating(&["checkout", "-b", name, start_point])?;
        } else {
            self.run_mutating(&["branch", name, start_point])?;
        }
        Ok(())
    }

    pub fn checkout(&self, branch: &str) -> anyhow::Result<()> {
        self.run_mutating(&["checkout", branch])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_mutating(&["branch", flag, branch])?;
        Ok(())
    }

    /// `git push`, using `--force-with-lease --force-if-includes` when
    /// `force` is requested and the installed git supports it (>= 2.30.0;
    /// plain `--force-with-lease` on >= 1.8.5), matching the upstream
    /// version gate in `git_operations.py`.
    pub fn push(&self, remote: &str, branch: &str, force: bool) -> anyhow::Result<()> {
        let mut args = vec!["push"];
        let force_opts = self.force_push_opts()?;
        if force {
            args.extend(force_opts.iter().map(String::as_str));
        }
        args.extend(["--set-upstream", remote, branch]);
        self.run_mutating(&args)?;
        Ok(())
    }

    fn force_push_opts(&self) -> anyhow::Result<Vec<String>> {
        let version = self.git_version()?;
        let (major, minor, patch) = parse_git_version(&version).unwrap_or((0, 0, 0));
        Ok(if (major, minor, patch) >= (2, 30, 0) {
            vec!["--force-with-lease".to_string(), "--force-if-includes".to_string()]
        } else if (major, minor, patch) >= (1, 8, 5) {
            vec!["--force-with-lease".to_string()]
        } else {
            vec!["--force".to_string()]
        })
    }

    pub fn merge(&self, branch_full_name: &str, commit_message: &str, no_edit: bool) -> anyhow::Result<()> {
        let edit_flag = if no_edit { "--no-edit" } else { "--edit" };
        self.run_mutating(&["merge", "-m", commit_message, branch_full_name, edit_flag])?;
        Ok(())
    }

    pub fn merge_ff_only(&self, branch_full_name: &str) -> anyhow::Result<()> {
        self.run_mutating(&["merge", "--ff-only", branch_full_name])?;
        Ok(())
    }

    pub fn pull_ff_only(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        self.run_mutating(&["pull", "--ff-only", remote, branch])?;
        Ok(())
    }

    /// `git reset --keep <to>`: moves HEAD/index to `to` while refusing if
    /// the working tree has changes that would be lost (softer than
    /// `--hard`, used by `update`'s merge-based path to rewind before a
    /// retry).
    pub fn reset_keep(&self, to: &str) -> anyhow::Result<()> {
        self.run_mutating(&["reset", "--keep", to])?;
        Ok(())
    }

    /// `git rebase --onto onto from_exclusive branch`, interactive unless
    /// `no_interactive`, with `GIT_MACHETE_REBASE_OPTS` appended, followed by
    /// the upstream's `rebase-merge/author-script` quoting fix-up (git
    /// issue referenced in upstream as VirtusLab/git-machete#935): some git
    /// versions write unquoted `KEY=value` lines to `author-script` that a
    /// *different* git version's `rebase --continue` then fails to parse as
    /// shell; re-quote any such line after the rebase starts.
    pub fn rebase(
        &self,
        onto: &str,
        from_exclusive: &str,
        branch: &str,
        no_interactive: bool,
        extra_rebase_opts: &[String],
    ) -> anyhow::Result<()> {
        let mut args: Vec<&str> = vec!["rebase"];
        let extra: Vec<&str> = extra_rebase_opts.iter().map(String::as_str).collect();
        args.extend(extra.iter());
        if !no_interactive {
            args.push("--interactive");
        }
        let (major, minor, _) = parse_git_version(&self.git_version()?).unwrap_or((0, 0, 0));
        if (major, minor) >= (2, 26) {
            args.push("--empty=drop");
        }
        args.extend(["--onto", onto, from_exclusive, branch]);
        let result = self.run_mutating(&args).map(|_| ());
        self.fix_author_script()?;
        result
    }

    fn fix_author_script(&self) -> anyhow::Result<()> {
        let path = self.git_dir()?.join("rebase-merge").join("author-script");
        if !path.is_file() {
            return Ok(());
        }
        let content = fs::read_to_string(&path)?;
        let faulty = regex::Regex::new(r"^[A-Z0-9_]+='[^']*$").expect("static regex");
        let fixed: String = content
            .lines()
            .map(|line| {
                if faulty.is_match(line) {
                    format!("{}'\n", line.trim_end())
                } else {
                    format!("{line}\n")
                }
            })
            .collect();
        fs::write(&path, fixed)?;
        Ok(())
    }

    /// `git commit-tree <tree> -p <parent> [-p <parent>...]`, with `message`
    /// as the commit message and `env` overriding author/committer
    /// identity/dates (used by `squash` to author the replacement commit as
    /// the earliest original commit's author).
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[&str],
        message: &str,
        env: &[(&str, &str)],
    ) -> anyhow::Result<String> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut args: Vec<&str> = vec!["commit-tree", tree];
        for parent in parents {
            args.push("-p");
            args.push(parent);
        }
        let mut cmd = Command::new("git");
        cmd.args(&args)
            .current_dir(self.discovery_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (k, v) in env {
            cmd.env(k, v);
        }
        log::debug!("$ git {}", args.join(" "));
        let mut child = cmd.spawn()?;
        child.stdin.take().expect("stdin was piped").write_all(message.as_bytes())?;
        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!(
                "git commit-tree failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        self.invalidate();
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `git update-ref <ref> <new-hash>` with an explicit reflog subject.
    ///
    /// The subject matters: `squash` writes a `"squash: ..."` subject
    /// (rather than the default-looking `"reset: ..."`) specifically so a
    /// later fork-point computation does not treat its own squash as a
    /// `reset:`-class event excluded by the filtered-reflog rules.
    pub fn update_ref(&self, refname: &str, new_hash: &str, reflog_subject: &str) -> anyhow::Result<()> {
        self.run_mutating(&["update-ref", "-m", reflog_subject, refname, new_hash])?;
        Ok(())
    }
}

fn parse_git_version(s: &str) -> Option<(u32, u32, u32)> {
    let mut it = s.split(|c: char| !c.is_ascii_digit()).filter(|s| !s.is_empty());
    let major = it.next()?.parse().ok()?;
    let minor = it.next()?.parse().ok()?;
    let patch = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semantic_git_version() {
        assert_eq!(parse_git_version("2.39.2"), Some((2, 39, 2)));
        assert_eq!(parse_git_version("2.30.0.windows.1"), Some((2, 30, 0)));
    }
}
