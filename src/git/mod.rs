//! Git gateway.
//!
//! A thin, cached layer over `git` subprocess invocations: a cheap-to-clone
//! handle (`Repository`) wrapping a `Rc<RefCell<RepoCache>>`, so repeated
//! queries within one run don't re-shell-out, and mutating operations
//! invalidate the cache so the next query re-reads ground truth.
//!
//! This crate's process model is deliberately single-threaded: there is no
//! delayed-stream/background-thread output plumbing here, only a single
//! `run` helper.

mod config;
mod error;
mod history;
mod mutate;
mod reflog;
mod refs;
mod remotes;
mod repository;

pub use config::*;
pub use error::GitError;
pub use history::*;
pub use mutate::*;
pub use reflog::*;
pub use refs::*;
pub use remotes::*;
pub use repository::{OperationInProgress, Repository};
