//! Traversal engine.
//!
//! Walks the layout in managed order; for each branch, proposes a bounded,
//! strictly-ordered set of corrective actions (slide-out, parent sync,
//! remote sync, PR retarget/create) and applies the confirmed ones. Every
//! prompt accepts `q`/`quit` to abort immediately and `yq` to apply the
//! current action then quit — both raise [`crate::error::InteractionStopped`],
//! caught here and turned into a normal, successful return.
//!
//! `traverse` reads no persisted cursor: re-invoking it after a partial run
//! simply starts again from the then-current branch.

use crate::branch::LocalBranchShortName;
use crate::error::{InteractionStopped, MacheteError};
use crate::hosting::CodeHostingClient;
use crate::ops::Session;
use crate::sync_status::{EdgeStatus, RemoteSyncStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTo {
    Here,
    NearestRemaining,
    Stay,
}

#[derive(Debug, Clone)]
pub struct TraversalPolicy {
    pub fetch: bool,
    pub use_merge: bool,
    pub push: bool,
    pub push_untracked: bool,
    pub start_from: Option<LocalBranchShortName>,
    pub return_to: ReturnTo,
    pub yes: bool,
}

impl Default for TraversalPolicy {
    fn default() -> Self {
        TraversalPolicy {
            fetch: false,
            use_merge: false,
            push: true,
            push_untracked: false,
            start_from: None,
            return_to: ReturnTo::Here,
            yes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Apply,
    Skip,
    Quit,
    ApplyThenQuit,
}

fn prompt(policy: &TraversalPolicy, text: &str) -> anyhow::Result<Prompt> {
    if policy.yes {
        println!("{text} (y)");
        return Ok(Prompt::Apply);
    }
    print!("{text} (y, N, q, yq) ");
    use std::io::Write;
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Prompt::Apply,
        "q" | "quit" => Prompt::Quit,
        "yq" => Prompt::ApplyThenQuit,
        _ => Prompt::Skip,
    })
}

pub fn traverse(session: &mut Session, policy: TraversalPolicy, hosting: Option<&dyn CodeHostingClient>) -> anyhow::Result<()> {
    if let Err(err) = run(session, &policy, hosting) {
        if err.downcast_ref::<InteractionStopped>().is_some() {
            println!("Stopped.");
            return Ok(());
        }
        return Err(err);
    }
    Ok(())
}

fn run(session: &mut Session, policy: &TraversalPolicy, hosting: Option<&dyn CodeHostingClient>) -> anyhow::Result<()> {
    if let Some(op) = session.repo.operation_in_progress()? {
        return Err(MacheteError::git_state(
            format!("a git {} is already in progress", op.as_str()),
            Some("resolve it, then re-run `git machete traverse`".to_string()),
        )
        .into());
    }

    if policy.fetch {
        for remote in session.repo.remotes()? {
            session.repo.fetch_remote(&remote)?;
        }
    }

    let start_branch = session.repo.current_branch()?.and_then(|b| LocalBranchShortName::new(b).ok());
    let mut cursor = policy
        .start_from
        .clone()
        .or(start_branch.clone())
        .or_else(|| session.layout.managed.first().cloned());

    while let Some(branch) = cursor.clone() {
        if !session.layout.is_managed(&branch) {
            break;
        }
        let index = session.layout.managed.iter().position(|b| b == &branch).unwrap();

        let acted = process_branch(session, policy, hosting, &branch)?;
        if acted.quit {
            return Err(InteractionStopped.into());
        }

        cursor = if session.layout.is_managed(&branch) {
            // Still there: move to whatever now follows it.
            let pos = session.layout.managed.iter().position(|b| b == &branch).unwrap();
            session.layout.managed.get(pos + 1).cloned()
        } else {
            // Slid out: its old slot now holds whatever replaced it (a
            // reparented child, or the branch that used to follow it), not
            // yet visited.
            session.layout.managed.get(index).cloned()
        };
    }

    println!("Reached the end of the branch layout.");

    let target = match policy.return_to {
        ReturnTo::Stay => None,
        ReturnTo::Here => start_branch,
        ReturnTo::NearestRemaining => start_branch.filter(|b| session.layout.is_managed(b)).or_else(|| session.layout.managed.first().cloned()),
    };
    if let Some(target) = target {
        if session.layout.is_managed(&target) {
            session.repo.checkout(target.as_str())?;
        }
    }
    Ok(())
}

struct ActionOutcome {
    quit: bool,
}

fn process_branch(
    session: &mut Session,
    policy: &TraversalPolicy,
    hosting: Option<&dyn CodeHostingClient>,
    branch: &LocalBranchShortName,
) -> anyhow::Result<ActionOutcome> {
    let index = session.reflog_index()?;
    let parent = session.layout.parent_of(branch).cloned();
    let qualifiers = session.layout.annotations.get(branch).map(|a| a.qualifiers).unwrap_or_default();

    // 1. needs_slide_out
    if let Some(parent) = &parent {
        if qualifiers.slide_out
            && crate::sync_status::is_merged_to(&session.repo, branch, parent, session.settings.squash_merge_detection)?
        {
            match prompt(policy, &format!("{branch} is merged into {parent}. Slide it out?"))? {
                Prompt::Apply => {
                    session.slide_out(std::slice::from_ref(branch), false)?;
                    return Ok(ActionOutcome { quit: false });
                }
                Prompt::ApplyThenQuit => {
                    session.slide_out(std::slice::from_ref(branch), false)?;
                    return Ok(ActionOutcome { quit: true });
                }
                Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                Prompt::Skip => {}
            }
        }
    }

    // 2. needs_parent_sync
    if let Some(parent) = &parent {
        let parent_full = parent.to_full().as_str().to_string();
        let branch_full = branch.to_full().as_str().to_string();
        let needs_sync = if policy.use_merge {
            !session.repo.is_ancestor_or_equal(&parent_full, &branch_full)?
        } else {
            qualifiers.rebase && {
                let edge = crate::sync_status::classify_edge(&session.repo, &index, branch, parent, true, session.settings.squash_merge_detection)?;
                edge != EdgeStatus::InSync && edge != EdgeStatus::MergedToParent
            }
        };
        if needs_sync {
            let verb = if policy.use_merge { "Merge" } else { "Rebase" };
            let outcome = prompt(policy, &format!("{verb} {branch} onto {parent}?"))?;
            match outcome {
                Prompt::Apply | Prompt::ApplyThenQuit => {
                    if branch.as_str() != session.repo.current_branch()?.unwrap_or_default() {
                        session.repo.checkout(branch.as_str())?;
                    }
                    if policy.use_merge {
                        session.repo.merge(&parent_full, &format!("Merge branch '{parent}' into {branch}"), false)?;
                    } else {
                        let fp = session.fork_point_of(&index, branch)?;
                        session.rebase_with_hook(branch, &parent_full, &fp)?;
                    }
                    if matches!(outcome, Prompt::ApplyThenQuit) {
                        return Ok(ActionOutcome { quit: true });
                    }
                }
                Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                Prompt::Skip => {}
            }
        }
    }

    // 3. needs_remote_sync
    let remote_status = crate::sync_status::classify_remote_sync(&session.repo, branch)?;
    if remote_status.needs_action() {
        let gated_by_push = matches!(
            remote_status,
            RemoteSyncStatus::AheadOfRemote | RemoteSyncStatus::Untracked | RemoteSyncStatus::DivergedNewerThanRemote
        );
        let allowed = if gated_by_push {
            qualifiers.push && policy.push && (remote_status != RemoteSyncStatus::Untracked || policy.push_untracked)
        } else {
            true
        };
        if allowed {
            match remote_status {
                RemoteSyncStatus::BehindRemote => {
                    if let Some(counterpart) = session.repo.strict_tracking_counterpart(branch.as_str())? {
                        if let Some((remote, _)) = counterpart.split_once('/') {
                            let outcome = prompt(policy, &format!("{branch} is behind {counterpart}. Pull (fast-forward)?"))?;
                            match outcome {
                                Prompt::Apply | Prompt::ApplyThenQuit => {
                                    session.repo.pull_ff_only(remote, branch.as_str())?;
                                    if outcome == Prompt::ApplyThenQuit {
                                        return Ok(ActionOutcome { quit: true });
                                    }
                                }
                                Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                                Prompt::Skip => {}
                            }
                        }
                    }
                }
                RemoteSyncStatus::Untracked | RemoteSyncStatus::AheadOfRemote | RemoteSyncStatus::DivergedNewerThanRemote => {
                    let remote = session
                        .repo
                        .remotes()?
                        .into_iter()
                        .next()
                        .ok_or_else(|| MacheteError::git_state(format!("{branch} has no remote to push to"), None))?;
                    let force = remote_status == RemoteSyncStatus::DivergedNewerThanRemote;
                    let outcome = prompt(policy, &format!("Push {branch} to {remote}?"))?;
                    match outcome {
                        Prompt::Apply | Prompt::ApplyThenQuit => {
                            session.repo.push(&remote, branch.as_str(), force)?;
                            if outcome == Prompt::ApplyThenQuit {
                                return Ok(ActionOutcome { quit: true });
                            }
                        }
                        Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                        Prompt::Skip => {}
                    }
                }
                RemoteSyncStatus::DivergedOlderThanRemote => {
                    crate::warn::warn(format!("{branch} has diverged from its remote and is older; resolve manually"));
                }
                RemoteSyncStatus::InSyncWithRemote | RemoteSyncStatus::NoRemotes => {}
            }
        }
    }

    // 4/5. code-hosting retarget/create PR
    if let (Some(client), Some(parent)) = (hosting, &parent) {
        let matches = client.list_by_head(branch.as_str())?;
        match matches.first() {
            Some(pr) if pr.base != parent.as_str() => {
                let outcome = prompt(policy, &format!("Retarget {} of {branch} to {parent}?", client.ref_label(pr.number)))?;
                match outcome {
                    Prompt::Apply | Prompt::ApplyThenQuit => {
                        client.set_base(pr.number, parent.as_str())?;
                        if outcome == Prompt::ApplyThenQuit {
                            return Ok(ActionOutcome { quit: true });
                        }
                    }
                    Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                    Prompt::Skip => {}
                }
            }
            None => {
                let outcome = prompt(policy, &format!("Create a pull/merge request for {branch} onto {parent}?"))?;
                match outcome {
                    Prompt::Apply | Prompt::ApplyThenQuit => {
                        client.create_pr(branch.as_str(), parent.as_str(), branch.as_str(), "", false)?;
                        if outcome == Prompt::ApplyThenQuit {
                            return Ok(ActionOutcome { quit: true });
                        }
                    }
                    Prompt::Quit => return Ok(ActionOutcome { quit: true }),
                    Prompt::Skip => {}
                }
            }
            _ => {}
        }
    }

    Ok(ActionOutcome { quit: false })
}
