//! PR/MR creation, retargeting, and checkout orchestration.
//!
//! These sit a layer above [`crate::hosting::CodeHostingClient`] itself: the
//! trait only knows how to talk to one provider's API, while these methods
//! also touch the git gateway (pushing, fetching PR refs) and the layout
//! (annotating, attaching a checked-out branch as a new managed node).

use crate::branch::LocalBranchShortName;
use crate::config::HostingSettings;
use crate::error::MacheteError;
use crate::hosting::{CodeHostingClient, IntroStyle, regenerate_intro};

use super::Session;

impl Session {
    /// Create a PR/MR for the current branch onto its layout parent,
    /// pushing first if the branch isn't already up to date on the remote.
    pub fn create_pr(&mut self, client: &dyn CodeHostingClient, settings: &HostingSettings, draft: bool, intro_style: IntroStyle) -> anyhow::Result<()> {
        let current = self
            .repo
            .current_branch()?
            .and_then(|b| LocalBranchShortName::new(b).ok())
            .ok_or_else(|| MacheteError::git_state("not currently on any branch", None))?;
        self.require_managed(&current)?;
        let parent = self.require_parent(&current)?;

        let remote_status = crate::sync_status::classify_remote_sync(&self.repo, &current)?;
        if remote_status.needs_action() {
            let remote = self.repo.remotes()?.into_iter().next().ok_or_else(|| MacheteError::git_state(format!("{current} has no remote to push to"), None))?;
            self.repo.push(&remote, current.as_str(), false)?;
        }

        let title = if settings.force_description_from_commit_message {
            self.repo.commit_subject(current.to_full().as_str())?.unwrap_or_else(|| current.to_string())
        } else {
            current.to_string()
        };

        let pr = client.create_pr(current.as_str(), parent.as_str(), &title, "", draft)?;

        let intro = regenerate_intro(&self.layout, &current, |b| self.pr_number_of(client, b), intro_style, &pr.description);
        client.set_description(pr.number, &intro)?;

        if settings.annotate_with_urls {
            self.layout.annotations.insert(current.clone(), crate::annotation::Annotation::parse(&pr.html_url));
        } else {
            self.layout.annotations.insert(current.clone(), crate::annotation::Annotation::parse(&client.ref_label(pr.number)));
        }
        self.save_layout(false)
    }

    /// Retarget the current branch's single open PR/MR to its layout parent.
    pub fn retarget_pr(&self, client: &dyn CodeHostingClient) -> anyhow::Result<()> {
        let current = self
            .repo
            .current_branch()?
            .and_then(|b| LocalBranchShortName::new(b).ok())
            .ok_or_else(|| MacheteError::git_state("not currently on any branch", None))?;
        self.require_managed(&current)?;
        let parent = self.require_parent(&current)?;

        let matches = client.list_by_head(current.as_str())?;
        let pr = matches
            .first()
            .ok_or_else(|| MacheteError::user_input(format!("no open PR/MR found with {current} as its head")))?;
        if pr.base != parent.as_str() {
            client.set_base(pr.number, parent.as_str())?;
            println!("Retargeted {} to {parent}", client.ref_label(pr.number));
        } else {
            println!("{} is already targeting {parent}", client.ref_label(pr.number));
        }
        Ok(())
    }

    /// Fetch PR/MR `number`'s head ref, check it out as a local branch, and
    /// attach it to the layout under the PR's base branch.
    pub fn checkout_pr(&mut self, client: &dyn CodeHostingClient, number: u64) -> anyhow::Result<()> {
        let pr = client.get_by_number(number)?;
        let local = LocalBranchShortName::new(pr.head.clone())?;
        let remote = self.repo.remotes()?.into_iter().next().ok_or_else(|| MacheteError::git_state("no remote configured", None))?;
        let refspec = format!("+{}:refs/heads/{}", client.ref_name_for_pr(number), local.as_str());
        self.repo.fetch_refspec(&remote, &refspec)?;
        self.repo.checkout(local.as_str())?;

        if !self.layout.is_managed(&local) {
            let parent = LocalBranchShortName::new(pr.base.clone()).ok().filter(|p| self.layout.is_managed(p));
            self.layout.add_branch(local.clone(), parent, false);
        }
        self.layout.annotations.insert(local.clone(), crate::annotation::Annotation::parse(&client.ref_label(number)));
        self.save_layout(false)
    }

    fn pr_number_of(&self, client: &dyn CodeHostingClient, branch: &LocalBranchShortName) -> Option<u64> {
        client.list_by_head(branch.as_str()).ok()?.into_iter().next().map(|pr| pr.number)
    }
}
