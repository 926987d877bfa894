//! External hook discovery and execution.
//!
//! Resolves `core.hooksPath` or `<git-dir>/hooks`, checks the executable
//! bit, runs with `std::process::Command`, and inspects the exit code. Three
//! hooks are recognized: `machete-pre-rebase`, `machete-post-slide-out`, and
//! `machete-status-branch`.

use std::path::PathBuf;
use std::process::Command;

use crate::branch::LocalBranchShortName;
use crate::git::Repository;

fn hooks_dir(repo: &Repository) -> anyhow::Result<PathBuf> {
    if let Some(configured) = repo.config_get("core.hooksPath")? {
        Ok(PathBuf::from(configured))
    } else {
        Ok(repo.git_dir()?.join("hooks"))
    }
}

fn hook_path(repo: &Repository, name: &str) -> anyhow::Result<Option<PathBuf>> {
    let path = hooks_dir(repo)?.join(name);
    if is_executable(&path) { Ok(Some(path)) } else { Ok(None) }
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}

/// `machete-pre-rebase <new-base> <fork-point-hash> <branch>` — a non-zero
/// exit vetoes the rebase.
pub fn run_pre_rebase(repo: &Repository, new_base: &str, fork_point: &str, branch: &LocalBranchShortName) -> anyhow::Result<bool> {
    let Some(path) = hook_path(repo, "machete-pre-rebase")? else {
        return Ok(true);
    };
    log::debug!("running machete-pre-rebase hook ({})", path.display());
    let status = Command::new(&path)
        .args([new_base, fork_point, branch.as_str()])
        .current_dir(repo.discovery_path())
        .status()?;
    Ok(status.success())
}

/// `machete-post-slide-out <new-upstream> <slid-out-branch> <new-downstreams…>`.
pub fn run_post_slide_out(
    repo: &Repository,
    new_upstream: &LocalBranchShortName,
    slid_out: &LocalBranchShortName,
    new_downstreams: &[LocalBranchShortName],
) -> anyhow::Result<()> {
    let Some(path) = hook_path(repo, "machete-post-slide-out")? else {
        return Ok(());
    };
    log::debug!("running machete-post-slide-out hook ({})", path.display());
    let mut args = vec![new_upstream.as_str().to_string(), slid_out.as_str().to_string()];
    args.extend(new_downstreams.iter().map(|b| b.as_str().to_string()));
    let status = Command::new(&path)
        .args(&args)
        .current_dir(repo.discovery_path())
        .status()?;
    if !status.success() {
        anyhow::bail!(
            "The machete-post-slide-out hook exited with {}, aborting.",
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}

/// `machete-status-branch <branch>` — stdout's first line is appended to
/// the status line for `branch`. `ASCII_ONLY` is exported in its environment.
pub fn run_status_branch_hook(repo: &Repository, branch: &LocalBranchShortName) -> anyhow::Result<Option<String>> {
    let Some(path) = hook_path(repo, "machete-status-branch")? else {
        return Ok(None);
    };
    let output = Command::new(&path)
        .arg(branch.as_str())
        .current_dir(repo.discovery_path())
        .env("ASCII_ONLY", if crate::styling::ascii_only() { "true" } else { "false" })
        .output()?;
    if !output.status.success() {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().next().map(str::to_string))
}
