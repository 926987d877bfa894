//! Provider/repo resolution.

use regex::Regex;

use crate::config::HostingSettings;
use crate::error::MacheteError;
use crate::git::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    GitLab,
}

impl Provider {
    pub fn key(self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
        }
    }

    pub fn default_domain(self) -> &'static str {
        match self {
            Provider::GitHub => "github.com",
            Provider::GitLab => "gitlab.com",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedRepo {
    pub provider: Provider,
    pub domain: String,
    pub organization: String,
    pub repository: String,
    pub remote: String,
}

/// Match a remote URL (HTTPS, SSH `git@host:org/repo`, or `ssh://`) against
/// a provider's URL patterns.
fn match_url(url: &str, domain_hint: Option<&str>) -> Option<(Provider, String, String, String)> {
    let https = Regex::new(r"^https://([^/]+)/([^/]+)/(.+?)(?:\.git)?/?$").expect("static regex");
    let ssh_scp = Regex::new(r"^git@([^:]+):([^/]+)/(.+?)(?:\.git)?/?$").expect("static regex");
    let ssh_url = Regex::new(r"^ssh://git@([^/:]+)(?::\d+)?/([^/]+)/(.+?)(?:\.git)?/?$").expect("static regex");

    let captures = https
        .captures(url)
        .or_else(|| ssh_scp.captures(url))
        .or_else(|| ssh_url.captures(url))?;
    let domain = captures[1].to_string();
    let org = captures[2].to_string();
    let repo = captures[3].to_string();

    if let Some(hint) = domain_hint {
        if domain != hint {
            return None;
        }
    }

    let provider = if domain.contains("github") {
        Provider::GitHub
    } else if domain.contains("gitlab") {
        Provider::GitLab
    } else {
        return None;
    };
    Some((provider, domain, org, repo))
}

/// Resolve the effective `(domain, organization, repository, remote)` tuple
/// for `provider`: explicit git-config keys win; otherwise the sole matching
/// remote; otherwise a remote named `origin`; otherwise a user-actionable
/// error.
pub fn resolve_repo(repo: &Repository, provider: Provider) -> anyhow::Result<ResolvedRepo> {
    let settings = HostingSettings::load(repo, provider.key())?;
    if let (Some(org), Some(r)) = (&settings.organization, &settings.repository) {
        return Ok(ResolvedRepo {
            provider,
            domain: settings.domain.clone().unwrap_or_else(|| provider.default_domain().to_string()),
            organization: org.clone(),
            repository: r.clone(),
            remote: settings.remote.clone().unwrap_or_else(|| "origin".to_string()),
        });
    }

    let mut matches = Vec::new();
    for remote in repo.remotes()? {
        if let Some(url) = repo.remote_url(&remote)? {
            if let Some((p, domain, org, r)) = match_url(&url, settings.domain.as_deref()) {
                if p == provider {
                    matches.push(ResolvedRepo {
                        provider,
                        domain,
                        organization: org,
                        repository: r,
                        remote: remote.clone(),
                    });
                }
            }
        }
    }

    if matches.len() == 1 {
        return Ok(matches.into_iter().next().expect("len checked"));
    }
    if let Some(origin) = matches.iter().find(|m| m.remote == "origin") {
        return Ok(origin.clone());
    }
    if matches.is_empty() {
        Err(MacheteError::user_input(format!(
            "could not determine the {} repository from any remote; set machete.{}.{{organization,repository}}",
            provider.key(),
            provider.key()
        ))
        .into())
    } else {
        Err(MacheteError::user_input(format!(
            "multiple remotes match {}; set machete.{}.remote to disambiguate",
            provider.key(),
            provider.key()
        ))
        .into())
    }
}
