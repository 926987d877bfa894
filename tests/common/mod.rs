//! Shared test harness: throwaway git repositories for integration tests.
//!
//! `TestRepo`: a `TempDir`-backed repo with an isolated git config and a
//! `run_git` helper, covering what this crate's domain logic needs — no
//! worktrees, no shell/PTY integration.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use machete::git::Repository;
use tempfile::TempDir;

pub struct TestRepo {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Initialize a repo on `main` with isolated identity/config, no commits yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).expect("create repo dir");

        let repo = TestRepo { _temp_dir: temp_dir, root };
        repo.run_git(&["init", "-q", "-b", "main"]);
        repo.run_git(&["config", "user.name", "Test User"]);
        repo.run_git(&["config", "user.email", "test@example.com"]);
        repo.run_git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// A [`Repository`] handle pointed at this test repo.
    pub fn handle(&self) -> Repository {
        Repository::at(self.root.clone()).expect("discover test repo")
    }

    pub fn run_git(&self, args: &[&str]) {
        let output = Command::new("git").args(args).current_dir(&self.root).output().expect("spawn git");
        assert!(
            output.status.success(),
            "git {} failed:\n{}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    pub fn run_git_stdout(&self, args: &[&str]) -> String {
        let output = Command::new("git").args(args).current_dir(&self.root).output().expect("spawn git");
        assert!(output.status.success(), "git {} failed", args.join(" "));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write `contents` to `name` and stage it.
    pub fn write_file(&self, name: &str, contents: &str) {
        std::fs::write(self.root.join(name), contents).expect("write file");
        self.run_git(&["add", name]);
    }

    /// Commit whatever is staged.
    pub fn commit(&self, message: &str) {
        self.run_git(&["commit", "-q", "-m", message, "--allow-empty"]);
    }

    /// Write one file unique to this commit, stage, and commit — the common
    /// case of "advance history by one commit".
    pub fn commit_file(&self, name: &str, message: &str) {
        self.write_file(name, message);
        self.commit(message);
    }

    pub fn checkout_new_branch(&self, name: &str) {
        self.run_git(&["checkout", "-q", "-b", name]);
    }

    pub fn checkout(&self, name: &str) {
        self.run_git(&["checkout", "-q", name]);
    }

    pub fn current_branch(&self) -> String {
        self.run_git_stdout(&["rev-parse", "--abbrev-ref", "HEAD"])
    }
}
