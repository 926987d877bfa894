//! Code-hosting integration.
//!
//! A capability-set trait implemented by two
//! concrete clients, [`github::GitHubClient`] and [`gitlab::GitLabClient`],
//! both built directly on `reqwest` (blocking) and `serde_json` rather than
//! a provider SDK.

mod github;
mod gitlab;
mod pr_intro;
mod resolve;
mod token;

pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use pr_intro::{IntroStyle, regenerate_intro};
pub use resolve::{Provider, ResolvedRepo, resolve_repo};
pub use token::discover_token;

/// One pull/merge request as the core needs to see it, provider-neutral.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub number: u64,
    pub head: String,
    pub base: String,
    pub title: String,
    pub description: String,
    pub draft: bool,
    pub milestone: Option<String>,
    pub html_url: String,
    pub author: String,
}

/// Pull the `rel="next"` target out of an RFC 5988 `Link` header, the way
/// both GitHub and GitLab paginate collection endpoints.
pub(crate) fn next_page_url(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let mut segments = part.split(';').map(str::trim);
        let url_part = segments.next()?;
        let is_next = segments.any(|s| s == "rel=\"next\"");
        if is_next {
            return Some(url_part.trim_start_matches('<').trim_end_matches('>').to_string());
        }
    }
    None
}

/// The capability set this trait exposes: `{create_pr, set_base, set_description,
/// set_milestone, set_draft, list_open_prs, list_by_head, get_by_number,
/// get_current_user, resolve_repo_by_id, ref_name_for_pr}`.
pub trait CodeHostingClient {
    fn provider_name(&self) -> &'static str;

    fn create_pr(&self, head: &str, base: &str, title: &str, description: &str, draft: bool) -> anyhow::Result<PullRequest>;
    fn set_base(&self, number: u64, base: &str) -> anyhow::Result<()>;
    fn set_description(&self, number: u64, description: &str) -> anyhow::Result<()>;
    fn set_milestone(&self, number: u64, milestone: &str) -> anyhow::Result<()>;
    fn set_draft(&self, number: u64, draft: bool) -> anyhow::Result<()>;
    fn list_open_prs(&self) -> anyhow::Result<Vec<PullRequest>>;
    fn list_by_head(&self, head: &str) -> anyhow::Result<Vec<PullRequest>>;
    fn get_by_number(&self, number: u64) -> anyhow::Result<PullRequest>;
    fn get_current_user(&self) -> anyhow::Result<String>;
    /// `(org, repo, clone-url)` for a numeric repository id, used when
    /// following a fork relationship.
    fn resolve_repo_by_id(&self, id: u64) -> anyhow::Result<(String, String, String)>;
    /// `PR #<n>` / `MR !<n>`, the label used in branch annotations.
    fn ref_label(&self, number: u64) -> String;
    /// The internal ref name to fetch a PR's head under (e.g.
    /// `refs/pull/<n>/head` on GitHub, `refs/merge-requests/<n>/head` on
    /// GitLab), used by `checkout`.
    fn ref_name_for_pr(&self, number: u64) -> String;
}
