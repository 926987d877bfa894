//! `GitError`: the subset of gateway failures callers want to match on.
//!
//! Everything else (spawn failure, non-UTF-8 output) stays as a plain
//! `anyhow::Error` with `.context(...)` — a split between "errors worth a
//! variant" and "errors worth a context string".

use std::fmt;

#[derive(Debug)]
pub enum GitError {
    /// A branch-requiring operation was attempted while HEAD is detached.
    DetachedHead { action: Option<String> },
    /// `git rev-parse`/`git show-ref` found no such ref.
    UnknownRevision(String),
    /// A rebase/merge/cherry-pick/revert/bisect is already in progress.
    OperationInProgress(&'static str),
    /// A non-zero exit from a `git` invocation not otherwise classified.
    CommandFailed { command: String, stderr: String },
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitError::DetachedHead { action } => match action {
                Some(a) => write!(f, "Not currently on any branch; cannot {a} in detached HEAD state"),
                None => write!(f, "Not currently on any branch"),
            },
            GitError::UnknownRevision(r) => write!(f, "`{r}` does not resolve to a commit"),
            GitError::OperationInProgress(kind) => {
                write!(f, "A {kind} is currently in progress; finish or abort it first")
            }
            GitError::CommandFailed { command, stderr } => write!(f, "`{command}` failed:\n{stderr}"),
        }
    }
}

impl std::error::Error for GitError {}
