//! GitLab client.
//!
//! REST against `<host>/api/v4`, merge requests standing in for pull
//! requests throughout. Listing endpoints follow `Link: rel="next"` across
//! every page.

use serde_json::{Value, json};
use urlencoding::encode;

use crate::error::MacheteError;

use super::{CodeHostingClient, PullRequest};

pub struct GitLabClient {
    http: reqwest::blocking::Client,
    api_base: String,
    project_path: String,
    token: String,
}

impl GitLabClient {
    pub fn new(domain: &str, organization: &str, repository: &str, token: &str) -> Self {
        GitLabClient {
            http: reqwest::blocking::Client::new(),
            api_base: format!("https://{domain}/api/v4"),
            project_path: format!("{organization}/{repository}"),
            token: token.to_string(),
        }
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}{path}", self.api_base, encode(&self.project_path))
    }

    fn request(&self, method: reqwest::Method, url: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let mut req = self.http.request(method, url).header("PRIVATE-TOKEN", &self.token);
        if let Some(b) = &body {
            req = req.json(b);
        }
        let response = req.send()?;
        let status = response.status();
        if status.as_u16() >= 400 {
            let text = response.text().unwrap_or_default();
            return Err(translate_error(status.as_u16(), &text).into());
        }
        Ok(response.json().unwrap_or(Value::Null))
    }

    /// GET `url` and every subsequent page found via the `Link: rel="next"`
    /// header, concatenating each page's JSON array.
    fn get_all_pages(&self, url: &str) -> anyhow::Result<Vec<Value>> {
        let mut out = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next.take() {
            let response = self.http.get(&url).header("PRIVATE-TOKEN", &self.token).send()?;
            let status = response.status();
            if status.as_u16() >= 400 {
                let text = response.text().unwrap_or_default();
                return Err(translate_error(status.as_u16(), &text).into());
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

    fn to_mr(v: &Value) -> PullRequest {
        PullRequest {
            number: v["iid"].as_u64().unwrap_or(0),
            head: v["source_branch"].as_str().unwrap_or_default().to_string(),
            base: v["target_branch"].as_str().unwrap_or_default().to_string(),
            title: v["title"].as_str().unwrap_or_default().to_string(),
            description: v["description"].as_str().unwrap_or_default().to_string(),
            draft: v["draft"].as_bool().unwrap_or(false),
            milestone: v["milestone"]["title"].as_str().map(str::to_string),
            html_url: v["web_url"].as_str().unwrap_or_default().to_string(),
            author: v["author"]["username"].as_str().unwrap_or_default().to_string(),
        }
    }
}

impl CodeHostingClient for GitLabClient {
    fn provider_name(&self) -> &'static str {
        "gitlab"
    }

    fn create_pr(&self, head: &str, base: &str, title: &str, description: &str, draft: bool) -> anyhow::Result<PullRequest> {
        let title = if draft { format!("Draft: {title}") } else { title.to_string() };
        let body = json!({"source_branch": head, "target_branch": base, "title": title, "description": description});
        let v = self.request(reqwest::Method::POST, &self.project_url("/merge_requests"), Some(body))?;
        Ok(Self::to_mr(&v))
    }

    fn set_base(&self, number: u64, base: &str) -> anyhow::Result<()> {
        self.request(
            reqwest::Method::PUT,
            &self.project_url(&format!("/merge_requests/{number}")),
            Some(json!({"target_branch": base})),
        )?;
        Ok(())
    }

    fn set_description(&self, number: u64, description: &str) -> anyhow::Result<()> {
        self.request(
            reqwest::Method::PUT,
            &self.project_url(&format!("/merge_requests/{number}")),
            Some(json!({"description": description})),
        )?;
        Ok(())
    }

    fn set_milestone(&self, number: u64, milestone: &str) -> anyhow::Result<()> {
        self.request(
            reqwest::Method::PUT,
            &self.project_url(&format!("/merge_requests/{number}")),
            Some(json!({"milestone_id": milestone})),
        )?;
        Ok(())
    }

    fn set_draft(&self, number: u64, draft: bool) -> anyhow::Result<()> {
        let pr = self.get_by_number(number)?;
        let title = pr.title.strip_prefix("Draft: ").unwrap_or(&pr.title).to_string();
        let new_title = if draft { format!("Draft: {title}") } else { title };
        self.request(
            reqwest::Method::PUT,
            &self.project_url(&format!("/merge_requests/{number}")),
            Some(json!({"title": new_title})),
        )?;
        Ok(())
    }

    fn list_open_prs(&self) -> anyhow::Result<Vec<PullRequest>> {
        let pages = self.get_all_pages(&self.project_url("/merge_requests?state=opened&per_page=100"))?;
        Ok(pages.iter().map(Self::to_mr).collect())
    }

    fn list_by_head(&self, head: &str) -> anyhow::Result<Vec<PullRequest>> {
        let url = self.project_url(&format!("/merge_requests?state=opened&per_page=100&source_branch={}", encode(head)));
        let pages = self.get_all_pages(&url)?;
        Ok(pages.iter().map(Self::to_mr).collect())
    }

    fn get_by_number(&self, number: u64) -> anyhow::Result<PullRequest> {
        let v = self.request(reqwest::Method::GET, &self.project_url(&format!("/merge_requests/{number}")), None)?;
        Ok(Self::to_mr(&v))
    }

    fn get_current_user(&self) -> anyhow::Result<String> {
        let v = self.request(reqwest::Method::GET, &format!("{}/user", self.api_base), None)?;
        v["username"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MacheteError::hosting("gitlab", "could not determine the authenticated user").into())
    }

    fn resolve_repo_by_id(&self, id: u64) -> anyhow::Result<(String, String, String)> {
        let v = self.request(reqwest::Method::GET, &format!("{}/projects/{id}", self.api_base), None)?;
        let full_path = v["path_with_namespace"].as_str().unwrap_or_default();
        let (org, repo) = full_path.rsplit_once('/').unwrap_or(("", full_path));
        let clone_url = v["http_url_to_repo"].as_str().unwrap_or_default().to_string();
        Ok((org.to_string(), repo.to_string(), clone_url))
    }

    fn ref_label(&self, number: u64) -> String {
        format!("MR !{number}")
    }

    fn ref_name_for_pr(&self, number: u64) -> String {
        format!("refs/merge-requests/{number}/head")
    }
}

fn translate_error(status: u16, body: &str) -> MacheteError {
    let message = match status {
        401 | 403 => "missing or invalid token; set GITLAB_TOKEN or re-authenticate your CLI".to_string(),
        404 => "project or merge request not found".to_string(),
        409 => "a merge request already exists for this source/target pair".to_string(),
        422 => format!("validation failed: {body}"),
        s if s >= 500 => "the code-hosting service is experiencing an outage".to_string(),
        s => format!("request failed with status {s}: {body}"),
    };
    MacheteError::hosting("gitlab", message)
}
