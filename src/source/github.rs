//! GitHub release source implementation.

use async_trait::async_trait;
use log::debug;

use crate::error::LauncherError;
use crate::http::HttpClient;

use super::{Asset, Release, ReleaseSource, RepoId};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository publishing the game builds.
pub const DEFAULT_REPO: &str = "coop-deluxe/sm64coopdx";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub name: Option<String>,
        #[serde(default)]
        pub prerelease: bool,
        pub body: Option<String>,
        #[serde(default)]
        pub assets: Vec<Asset>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        #[serde(default)]
        pub size: u64,
        pub browser_download_url: String,
    }
}

/// Lists releases of one GitHub repository.
pub struct GitHubSource {
    http_client: HttpClient,
    api_url: String,
    repo: RepoId,
}

impl GitHubSource {
    /// Create from an existing HttpClient and an API base URL.
    pub fn from_http_client(http_client: HttpClient, api_url: &str, repo: RepoId) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo,
        }
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_url, self.repo.owner, self.repo.repo
        )
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    fn repo(&self) -> &RepoId {
        &self.repo
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_releases(&self) -> Result<Vec<Release>, LauncherError> {
        let url = self.releases_url();
        debug!("Fetching releases from {}...", url);

        let parsed: Vec<api::Release> = self
            .http_client
            .get_json(&url, &[("per_page", "100")])
            .await
            .map_err(LauncherError::network)?;

        debug!("Fetched {} release(s) for {}", parsed.len(), self.repo);
        Ok(parsed.into_iter().map(Release::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_changelog(&self) -> Result<String, LauncherError> {
        let url = format!("{}/latest", self.releases_url());
        debug!("Fetching latest release from {}...", url);

        let latest: api::Release = self
            .http_client
            .get_json(&url, &[])
            .await
            .map_err(LauncherError::network)?;

        Ok(latest.body.unwrap_or_default())
    }
}

impl From<api::Release> for Release {
    fn from(r: api::Release) -> Self {
        let name = r
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| r.tag_name.clone());
        Release {
            name,
            tag: r.tag_name,
            prerelease: r.prerelease,
            assets: r.assets.into_iter().map(Asset::from).collect(),
        }
    }
}

impl From<api::Asset> for Asset {
    fn from(a: api::Asset) -> Self {
        Asset {
            name: a.name,
            download_url: a.browser_download_url,
            size: a.size,
        }
    }
}
