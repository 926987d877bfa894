//! Error taxonomy.
//!
//! A plain enum with a hand-written [`std::fmt::Display`] impl that renders
//! a styled, one-line,
//! user-facing message, rather than a `thiserror` derive. Plumbing errors
//! (subprocess spawn failures, I/O) stay as `anyhow::Error` and are given
//! context with `.context(...)`; only errors the core itself *detects* as
//! one of the six named categories get wrapped in [`MacheteError`].

use crate::styling::bold;

/// The error categories this crate distinguishes.
#[derive(Debug)]
pub enum MacheteError {
    /// Invalid branch name on the CLI, invalid direction, unknown qualifier
    /// syntax, conflicting options.
    UserInput(String),
    /// Unparseable indentation, duplicate branch name, excessive depth jump,
    /// missing branch-layout file.
    LayoutFile {
        path: std::path::PathBuf,
        line: Option<usize>,
        message: String,
    },
    /// Operation in progress, detached HEAD where a branch is required,
    /// missing upstream, missing fork point.
    GitState { message: String, remedy: Option<String> },
    /// Non-zero exit of a git subprocess.
    UnderlyingGit { command: String, stderr: String },
    /// HTTP >= 400, JSON parse failure, TLS/DNS failure talking to a
    /// code-hosting API.
    Hosting { provider: &'static str, message: String },
    /// A violated internal invariant (e.g. a managed branch with no parent
    /// and not in roots).
    Internal(String),
}

impl MacheteError {
    pub fn user_input(msg: impl Into<String>) -> Self {
        MacheteError::UserInput(msg.into())
    }

    pub fn layout_file(path: impl Into<std::path::PathBuf>, line: Option<usize>, msg: impl Into<String>) -> Self {
        MacheteError::LayoutFile {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    pub fn git_state(msg: impl Into<String>, remedy: Option<String>) -> Self {
        MacheteError::GitState {
            message: msg.into(),
            remedy,
        }
    }

    pub fn underlying_git(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        MacheteError::UnderlyingGit {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn hosting(provider: &'static str, msg: impl Into<String>) -> Self {
        MacheteError::Hosting {
            provider,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        MacheteError::Internal(msg.into())
    }
}

impl std::fmt::Display for MacheteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MacheteError::UserInput(msg) => write!(f, "{msg}"),
            MacheteError::LayoutFile { path, line, message } => match line {
                Some(l) => write!(f, "{}, line {l}: {message}", path.display()),
                None => write!(f, "{}: {message}", path.display()),
            },
            MacheteError::GitState { message, remedy } => match remedy {
                Some(r) => write!(f, "{message}\n\nRun: {}", bold(r)),
                None => write!(f, "{message}"),
            },
            MacheteError::UnderlyingGit { command, stderr } => {
                write!(f, "`{}` failed:\n{stderr}", bold(command))
            }
            MacheteError::Hosting { provider, message } => write!(f, "{provider}: {message}"),
            MacheteError::Internal(msg) => write!(
                f,
                "internal error: {msg}\n\nThis is a bug in git-machete; please file an issue."
            ),
        }
    }
}

impl std::error::Error for MacheteError {}

/// Signal raised when a traversal prompt is answered `q`/`quit`.
///
/// Caught by the traversal engine and turned into a normal,
/// successful return rather than a process error.
#[derive(Debug)]
pub struct InteractionStopped;

impl std::fmt::Display for InteractionStopped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interaction stopped by user")
    }
}

impl std::error::Error for InteractionStopped {}
