//! Token discovery.
//!
//! Tried in order, first non-empty wins: `<PROVIDER>_TOKEN` env var;
//! `~/.<provider>-token` (single-line for the default domain, or `<token>
//! <domain>` entries); the `glab`/`gh`/`hub` CLI auth store.

use std::process::Command;

/// `provider` is `"github"` or `"gitlab"`; `domain` is the effective host
/// (e.g. `github.com`, or an Enterprise/self-managed hostname).
pub fn discover_token(provider: &str, domain: &str) -> Option<String> {
    let env_var = format!("{}_TOKEN", provider.to_uppercase());
    if let Ok(token) = std::env::var(&env_var) {
        if !token.is_empty() {
            return Some(token);
        }
    }

    if let Some(token) = token_from_dotfile(provider, domain) {
        return Some(token);
    }

    token_from_cli(provider, domain)
}

fn token_from_dotfile(provider: &str, domain: &str) -> Option<String> {
    let home = dirs::home_dir()?;
    let path = home.join(format!(".{provider}-token"));
    let contents = std::fs::read_to_string(path).ok()?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(' ') {
            Some((token, line_domain)) if line_domain.trim() == domain => return Some(token.to_string()),
            None if domain == default_domain(provider) => return Some(line.to_string()),
            _ => continue,
        }
    }
    None
}

fn default_domain(provider: &str) -> &'static str {
    match provider {
        "github" => "github.com",
        "gitlab" => "gitlab.com",
        _ => "",
    }
}

fn token_from_cli(provider: &str, domain: &str) -> Option<String> {
    let (cli, args): (&str, Vec<&str>) = match provider {
        "github" => ("gh", vec!["auth", "token", "--hostname", domain]),
        "gitlab" => ("glab", vec!["auth", "token", "--hostname", domain]),
        _ => return None,
    };
    if let Some(token) = run_cli_token(cli, &args) {
        return Some(token);
    }
    run_cli_token("hub", &["api", "-t"])
}

fn run_cli_token(cli: &str, args: &[&str]) -> Option<String> {
    if which::which(cli).is_err() {
        return None;
    }
    let output = Command::new(cli).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
