//! Typed settings snapshot.
//!
//! Assembled once per run from `machete.*` git-config keys plus a couple of
//! environment variables, rather than scattering raw config lookups through
//! the operation code: machete has nowhere persistent to live other than
//! git config and the layout file itself.

use crate::git::Repository;
use crate::sync_status::SquashMergeDetection;

#[derive(Debug, Clone)]
pub struct MacheteSettings {
    pub use_top_level_machete_file: bool,
    pub extra_space_before_branch_name: bool,
    pub squash_merge_detection: SquashMergeDetection,
    pub traverse_push: bool,
}

impl MacheteSettings {
    pub fn load(repo: &Repository) -> anyhow::Result<Self> {
        Ok(MacheteSettings {
            use_top_level_machete_file: bool_or(repo, "machete.worktree.useTopLevelMacheteFile", true)?,
            extra_space_before_branch_name: bool_or(repo, "machete.status.extraSpaceBeforeBranchName", false)?,
            squash_merge_detection: squash_mode(repo)?,
            traverse_push: bool_or(repo, "machete.traverse.push", true)?,
        })
    }
}

fn bool_or(repo: &Repository, key: &str, default: bool) -> anyhow::Result<bool> {
    Ok(match repo.config_get(key)?.as_deref() {
        Some("true") | Some("yes") | Some("1") => true,
        Some("false") | Some("no") | Some("0") => false,
        _ => default,
    })
}

fn squash_mode(repo: &Repository) -> anyhow::Result<SquashMergeDetection> {
    Ok(match repo.config_get("machete.squashMergeDetection")?.as_deref() {
        Some("none") => SquashMergeDetection::None,
        Some("exact") => SquashMergeDetection::Exact,
        _ => SquashMergeDetection::Simple,
    })
}

/// Per-provider hosting settings, assembled from `machete.github.*`/
/// `machete.gitlab.*` git-config keys.
#[derive(Debug, Clone, Default)]
pub struct HostingSettings {
    pub domain: Option<String>,
    pub organization: Option<String>,
    pub repository: Option<String>,
    pub remote: Option<String>,
    pub annotate_with_urls: bool,
    pub force_description_from_commit_message: bool,
    pub pr_description_intro_style: Option<String>,
}

impl HostingSettings {
    pub fn load(repo: &Repository, provider: &str) -> anyhow::Result<Self> {
        let prefix = format!("machete.{provider}");
        Ok(HostingSettings {
            domain: repo.config_get(&format!("{prefix}.domain"))?,
            organization: repo.config_get(&format!("{prefix}.organization"))?,
            repository: repo.config_get(&format!("{prefix}.repository"))?,
            remote: repo.config_get(&format!("{prefix}.remote"))?,
            annotate_with_urls: bool_or(repo, &format!("{prefix}.annotateWithUrls"), false)?,
            force_description_from_commit_message: bool_or(repo, &format!("{prefix}.forceDescriptionFromCommitMessage"), false)?,
            pr_description_intro_style: repo.config_get(&format!("{prefix}.prDescriptionIntroStyle"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosting_settings_default_is_empty() {
        let s = HostingSettings::default();
        assert!(s.domain.is_none());
        assert!(!s.annotate_with_urls);
    }
}
