//! GitHub client.
//!
//! REST against `api.github.com` (or `<host>/api/v3` for GitHub Enterprise),
//! `reqwest::blocking` + `serde_json`, following `Link: rel="next"` across
//! every page of a listing endpoint and a single 307 redirect for
//! non-GET methods, since chaining further redirects isn't well-defined for
//! a mutating request.

use serde_json::{Value, json};

use crate::error::MacheteError;

use super::{CodeHostingClient, PullRequest};

pub struct GitHubClient {
    http: reqwest::blocking::Client,
    api_base: String,
    organization: String,
    repository: String,
    token: String,
}

impl GitHubClient {
    pub fn new(domain: &str, organization: &str, repository: &str, token: &str) -> Self {
        let api_base = if domain == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{domain}/api/v3")
        };
        GitHubClient {
            http: reqwest::blocking::Client::new(),
            api_base,
            organization: organization.to_string(),
            repository: repository.to_string(),
            token: token.to_string(),
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{path}", self.api_base, self.organization, self.repository)
    }

    fn request(&self, method: reqwest::Method, url: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "git-machete");
        if let Some(b) = &body {
            req = req.json(b);
        }
        let response = req.send()?;
        let status = response.status();

        if status.as_u16() == 307 {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            crate::warn::warn(format!("GitHub returned a 307 redirect for {url}; following once"));
            if let Some(location) = location {
                return self.request(reqwest::Method::GET, &location, body);
            }
        }

        if status.as_u16() >= 400 {
            let text = response.text().unwrap_or_default();
            return Err(translate_error("github", status.as_u16(), &text).into());
        }
        Ok(response.json().unwrap_or(Value::Null))
    }

    /// GET `url` and every subsequent page found via the `Link: rel="next"`
    /// header, concatenating each page's JSON array.
    fn get_all_pages(&self, url: &str) -> anyhow::Result<Vec<Value>> {
        let mut out = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next.take() {
            let response = self
                .http
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .header("User-Agent", "git-machete")
                .send()?;
            let status = response.status();
            if status.as_u16() >= 400 {
                let text = response.text().unwrap_or_default();
                return Err(translate_error("github", status.as_u16(), &text).into());
            }
            next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(super::next_page_url);
            let v: Value = response.json().unwrap_or(Value::Null);
            if let Some(array) = v.as_array() {
                out.extend(array.iter().cloned());
            }
        }
        Ok(out)
    }

    fn to_pr(v: &Value) -> PullRequest {
        PullRequest {
            number: v["number"].as_u64().unwrap_or(0),
            head: v["head"]["ref"].as_str().unwrap_or_default().to_string(),
            base: v["base"]["ref"].as_str().unwrap_or_default().to_string(),
            title: v["title"].as_str().unwrap_or_default().to_string(),
            description: v["body"].as_str().unwrap_or_default().to_string(),
            draft: v["draft"].as_bool().unwrap_or(false),
            milestone: v["milestone"]["title"].as_str().map(str::to_string),
            html_url: v["html_url"].as_str().unwrap_or_default().to_string(),
            author: v["user"]["login"].as_str().unwrap_or_default().to_string(),
        }
    }
}

impl CodeHostingClient for GitHubClient {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    fn create_pr(&self, head: &str, base: &str, title: &str, description: &str, draft: bool) -> anyhow::Result<PullRequest> {
        let body = json!({"title": title, "head": head, "base": base, "body": description, "draft": draft});
        let v = self.request(reqwest::Method::POST, &self.repo_url("/pulls"), Some(body))?;
        Ok(Self::to_pr(&v))
    }

    fn set_base(&self, number: u64, base: &str) -> anyhow::Result<()> {
        self.request(reqwest::Method::PATCH, &self.repo_url(&format!("/pulls/{number}")), Some(json!({"base": base})))?;
        Ok(())
    }

    fn set_description(&self, number: u64, description: &str) -> anyhow::Result<()> {
        self.request(
            reqwest::Method::PATCH,
            &self.repo_url(&format!("/pulls/{number}")),
            Some(json!({"body": description})),
        )?;
        Ok(())
    }

    fn set_milestone(&self, number: u64, milestone: &str) -> anyhow::Result<()> {
        self.request(
            reqwest::Method::PATCH,
            &self.repo_url(&format!("/issues/{number}")),
            Some(json!({"milestone": milestone})),
        )?;
        Ok(())
    }

    /// GitHub's REST API has no draft-toggle mutation; this goes through the
    /// `/graphql` endpoint instead.
    fn set_draft(&self, number: u64, draft: bool) -> anyhow::Result<()> {
        let pr = self.get_by_number(number)?;
        let node_id_query = json!({"query": format!("query {{ repository(owner: \"{}\", name: \"{}\") {{ pullRequest(number: {number}) {{ id }} }} }}", self.organization, self.repository)});
        let node = self.request(reqwest::Method::POST, &format!("{}/graphql", self.api_base), Some(node_id_query))?;
        let id = node["data"]["repository"]["pullRequest"]["id"]
            .as_str()
            .ok_or_else(|| MacheteError::hosting("github", "could not resolve PR node id for draft toggle"))?;
        let mutation_name = if draft { "convertPullRequestToDraft" } else { "markPullRequestReadyForReview" };
        let mutation = json!({"query": format!("mutation {{ {mutation_name}(input: {{ pullRequestId: \"{id}\" }}) {{ clientMutationId }} }}")});
        self.request(reqwest::Method::POST, &format!("{}/graphql", self.api_base), Some(mutation))?;
        let _ = pr;
        Ok(())
    }

    fn list_open_prs(&self) -> anyhow::Result<Vec<PullRequest>> {
        let pages = self.get_all_pages(&self.repo_url("/pulls?state=open&per_page=100"))?;
        Ok(pages.iter().map(Self::to_pr).collect())
    }

    fn list_by_head(&self, head: &str) -> anyhow::Result<Vec<PullRequest>> {
        let url = self.repo_url(&format!("/pulls?state=open&per_page=100&head={}:{head}", self.organization));
        let pages = self.get_all_pages(&url)?;
        Ok(pages.iter().map(Self::to_pr).collect())
    }

    fn get_by_number(&self, number: u64) -> anyhow::Result<PullRequest> {
        let v = self.request(reqwest::Method::GET, &self.repo_url(&format!("/pulls/{number}")), None)?;
        Ok(Self::to_pr(&v))
    }

    fn get_current_user(&self) -> anyhow::Result<String> {
        let v = self.request(reqwest::Method::GET, &format!("{}/user", self.api_base), None)?;
        v["login"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MacheteError::hosting("github", "could not determine the authenticated user").into())
    }

    fn resolve_repo_by_id(&self, id: u64) -> anyhow::Result<(String, String, String)> {
        let v = self.request(reqwest::Method::GET, &format!("{}/repositories/{id}", self.api_base), None)?;
        let org = v["owner"]["login"].as_str().unwrap_or_default().to_string();
        let repo = v["name"].as_str().unwrap_or_default().to_string();
        let clone_url = v["clone_url"].as_str().unwrap_or_default().to_string();
        Ok((org, repo, clone_url))
    }

    fn ref_label(&self, number: u64) -> String {
        format!("PR #{number}")
    }

    fn ref_name_for_pr(&self, number: u64) -> String {
        format!("refs/pull/{number}/head")
    }
}

/// Map an HTTP status to a `MacheteError::Hosting`, distinguishing
/// auth failures, not-found, conflicts, and validation errors
/// (401/403/404/409/422/5xx).
fn translate_error(provider: &'static str, status: u16, body: &str) -> MacheteError {
    let message = match status {
        401 | 403 => format!("missing or invalid token; set {}_TOKEN or re-authenticate your CLI", provider.to_uppercase()),
        404 => "repository or pull/merge request not found".to_string(),
        409 => "a pull/merge request already exists for this head/base pair".to_string(),
        422 => format!("validation failed: {body}"),
        s if s >= 500 => "the code-hosting service is experiencing an outage".to_string(),
        s => format!("request failed with status {s}: {body}"),
    };
    MacheteError::hosting(provider, message)
}
