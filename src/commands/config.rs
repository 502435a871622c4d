use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    http::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STALL_TIMEOUT, HttpClient},
    runtime::Runtime,
    source::{DEFAULT_API_URL, DEFAULT_REPO, GitHubSource, ReleaseSource, RepoId},
};

use super::paths::default_root;

pub const USER_AGENT: &str = "coopdx-launcher";
pub const API_URL_ENV: &str = "COOPDX_API_URL";
pub const REPO_ENV: &str = "COOPDX_REPO";

/// Settings given on the command line. `None` falls back to the
/// environment, then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root: Option<PathBuf>,
    pub api_url: Option<String>,
    pub repo: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

pub struct Config<R: Runtime, S: ReleaseSource> {
    pub runtime: R,
    pub source: S,
    pub http_client: HttpClient,
    pub root: PathBuf,
}

impl<R: Runtime> Config<R, GitHubSource> {
    pub fn new(runtime: R, options: Options) -> Result<Self> {
        let root = match options.root {
            Some(path) => path,
            None => default_root(&runtime)?,
        };
        // The game is spawned with its version directory as cwd
        let root = std::path::absolute(&root)
            .with_context(|| format!("Failed to resolve versions root {:?}", root))?;
        debug!("Using versions root {:?}", root);

        let api_url = options
            .api_url
            .or_else(|| runtime.env_var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let repo: RepoId = options
            .repo
            .or_else(|| runtime.env_var(REPO_ENV).ok())
            .unwrap_or_else(|| DEFAULT_REPO.to_string())
            .parse()?;

        let request_timeout = match options.timeout {
            Some(0) => bail!("Request timeout must be at least one second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let http_client =
            HttpClient::with_timeouts(client, request_timeout, DEFAULT_STALL_TIMEOUT);
        let source = GitHubSource::from_http_client(http_client.clone(), &api_url, repo);

        Ok(Self {
            runtime,
            source,
            http_client,
            root,
        })
    }
}
