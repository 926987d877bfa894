//! Branch-name value types.
//!
//! Four distinct types, deliberately not interchangeable: an API that wants a
//! local short name must not silently accept a full ref, and vice versa.
//! Newtypes around `String` rather than passing bare `String`s around and
//! validating by convention.

use std::fmt;

const LOCAL_HEADS_PREFIX: &str = "refs/heads/";
const REMOTE_PREFIX: &str = "refs/remotes/";

/// A 40-hex commit hash, or a 7+ hex prefix of one.
///
/// Validity is purely lexical: this type does not check that the hash
/// resolves to an actual object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        if s.len() < 7 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("`{s}` is not a valid commit hash");
        }
        Ok(CommitHash(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_full(&self) -> bool {
        self.0.len() == 40
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `develop`, `feature/foo` — never carries a `refs/...` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalBranchShortName(String);

impl LocalBranchShortName {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        if s.starts_with(LOCAL_HEADS_PREFIX) || s.starts_with(REMOTE_PREFIX) || s.starts_with("refs/") {
            anyhow::bail!("`{s}` is a full ref, not a local short branch name");
        }
        if s.is_empty() {
            anyhow::bail!("branch name must not be empty");
        }
        Ok(LocalBranchShortName(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_full(&self) -> LocalBranchFullName {
        LocalBranchFullName(format!("{LOCAL_HEADS_PREFIX}{}", self.0))
    }
}

impl fmt::Display for LocalBranchShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `refs/heads/develop`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalBranchFullName(String);

impl LocalBranchFullName {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        if !s.starts_with(LOCAL_HEADS_PREFIX) {
            anyhow::bail!("`{s}` is not a full local branch ref (expected `{LOCAL_HEADS_PREFIX}...`)");
        }
        Ok(LocalBranchFullName(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_short(&self) -> LocalBranchShortName {
        LocalBranchShortName(self.0[LOCAL_HEADS_PREFIX.len()..].to_string())
    }
}

impl fmt::Display for LocalBranchFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `origin/develop`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteBranchShortName(String);

impl RemoteBranchShortName {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        if s.starts_with("refs/") {
            anyhow::bail!("`{s}` is a full ref, not a remote short branch name");
        }
        let Some((remote, _branch)) = s.split_once('/') else {
            anyhow::bail!("`{s}` is not of the form `<remote>/<branch>`");
        };
        if remote.is_empty() {
            anyhow::bail!("`{s}` has an empty remote component");
        }
        Ok(RemoteBranchShortName(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<remote>` component.
    pub fn remote(&self) -> &str {
        self.0.split_once('/').expect("validated at construction").0
    }

    /// The `<branch>` component, i.e. without the remote prefix.
    pub fn branch(&self) -> &str {
        self.0.split_once('/').expect("validated at construction").1
    }

    pub fn to_full(&self) -> RemoteBranchFullName {
        RemoteBranchFullName(format!("{REMOTE_PREFIX}{}", self.0))
    }
}

impl fmt::Display for RemoteBranchShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `refs/remotes/origin/develop`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteBranchFullName(String);

impl RemoteBranchFullName {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        if !s.starts_with(REMOTE_PREFIX) {
            anyhow::bail!("`{s}` is not a full remote branch ref (expected `{REMOTE_PREFIX}...`)");
        }
        Ok(RemoteBranchFullName(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_short(&self) -> RemoteBranchShortName {
        RemoteBranchShortName(self.0[REMOTE_PREFIX.len()..].to_string())
    }
}

impl fmt::Display for RemoteBranchFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_full_ref_as_local_short() {
        assert!(LocalBranchShortName::new("refs/heads/develop").is_err());
    }

    #[test]
    fn local_short_full_roundtrip() {
        let short = LocalBranchShortName::new("feature/foo").unwrap();
        let full = short.to_full();
        assert_eq!(full.as_str(), "refs/heads/feature/foo");
        assert_eq!(full.to_short(), short);
    }

    #[test]
    fn remote_short_splits_remote_and_branch() {
        let r = RemoteBranchShortName::new("origin/feature/foo").unwrap();
        assert_eq!(r.remote(), "origin");
        assert_eq!(r.branch(), "feature/foo");
        assert_eq!(r.to_full().as_str(), "refs/remotes/origin/feature/foo");
    }

    #[test]
    fn remote_short_without_slash_is_rejected() {
        assert!(RemoteBranchShortName::new("origin").is_err());
    }

    #[test]
    fn commit_hash_rejects_short_or_non_hex() {
        assert!(CommitHash::new("abc").is_err());
        assert!(CommitHash::new("zzzzzzz").is_err());
        assert!(CommitHash::new("1234567").is_ok());
    }
}
