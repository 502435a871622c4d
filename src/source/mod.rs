//! Release source abstraction.
//!
//! A [`ReleaseSource`] lists the published builds of the game and their
//! downloadable assets. Fetch failures are reported as errors, never as an
//! empty list, so callers can tell "no releases" from "could not ask".

mod github;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LauncherError;

pub use github::{DEFAULT_API_URL, DEFAULT_REPO, GitHubSource};

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format. Expected 'owner/repo'.")
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub download_url: String,
    /// Size declared by the registry, for display only
    pub size: u64,
}

/// A published release with its assets, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Release {
    /// Display name (falls back to the tag when the release has no title)
    pub name: String,
    pub tag: String,
    pub prerelease: bool,
    pub assets: Vec<Asset>,
}

impl Release {
    /// Finds an asset by exact name, or case-insensitively if no exact match exists.
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.name == name)
            .or_else(|| self.assets.iter().find(|a| a.name.eq_ignore_ascii_case(name)))
    }

    /// Whether `query` names this release by title or by tag.
    pub fn matches(&self, query: &str) -> bool {
        self.name == query
            || self.tag == query
            || self.tag.trim_start_matches('v') == query.trim_start_matches('v')
    }
}

/// Finds a release by name or tag.
pub fn find_release<'a>(releases: &'a [Release], query: &str) -> Option<&'a Release> {
    releases.iter().find(|r| r.matches(query))
}

/// Trait for release registries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Repository being queried.
    fn repo(&self) -> &RepoId;

    /// Fetch all releases, newest first as the registry orders them.
    async fn fetch_releases(&self) -> Result<Vec<Release>, LauncherError>;

    /// Fetch the Markdown changelog of the latest release.
    async fn fetch_changelog(&self) -> Result<String, LauncherError>;
}
