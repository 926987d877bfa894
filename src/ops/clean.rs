//! `delete-unmanaged` / `clean`.

use crate::hosting::CodeHostingClient;

use super::Session;

impl Session {
    /// Delete local branches that aren't in the layout, after confirmation
    /// per branch (or in bulk under `--yes`).
    pub fn delete_unmanaged(&self) -> anyhow::Result<()> {
        let current = self.repo.current_branch()?;
        let mut deleted = Vec::new();
        for name in self.repo.local_branches()? {
            let branch = crate::branch::LocalBranchShortName::new(name.clone())?;
            if self.layout.is_managed(&branch) || current.as_deref() == Some(name.as_str()) {
                continue;
            }
            if self.confirm(&format!("Delete unmanaged branch {branch}?"))? {
                self.repo.delete_branch(branch.as_str(), false)?;
                deleted.push(branch);
            }
        }
        if deleted.is_empty() {
            println!("No unmanaged branches to delete");
        } else {
            println!("Deleted: {}", deleted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
        }
        Ok(())
    }

    /// `clean`: when `checkout_my_prs` is set, attach the current user's
    /// open PRs to the layout first, then run `delete_unmanaged`.
    pub fn clean(&mut self, checkout_my_prs: bool, client: Option<&dyn CodeHostingClient>) -> anyhow::Result<()> {
        if checkout_my_prs {
            let client = client.ok_or_else(|| crate::error::MacheteError::user_input("--checkout-my-github-prs requires a configured code-hosting token"))?;
            let me = client.get_current_user()?;
            let mine: Vec<u64> = client.list_open_prs()?.into_iter().filter(|pr| pr.author == me).map(|pr| pr.number).collect();
            for number in mine {
                self.checkout_pr(client, number)?;
            }
        }
        self.delete_unmanaged()
    }
}
