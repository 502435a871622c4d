//! HTTP client with timeouts and error handling.

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::time::Duration;

use super::status::check_status;

/// Time allowed to establish a TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for an API request, or for a download to start answering.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest gap tolerated between two chunks of a download.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of a completed download stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Bytes written to the destination
    pub written: u64,
    /// Size announced by the `content-length` header, if any
    pub declared: Option<u64>,
}

/// HTTP client with request and stall timeouts for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_timeout: Duration,
    stall_timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client with default timeouts.
    pub fn new(client: Client) -> Self {
        Self::with_timeouts(client, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STALL_TIMEOUT)
    }

    pub fn with_timeouts(client: Client, request_timeout: Duration, stall_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
            stall_timeout,
        }
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.request_timeout)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let response = check_status(response).with_context(|| format!("GET {} failed", url))?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// Streams a URL into the writer produced by `create_writer`.
    ///
    /// The writer is only created once the server has answered with a success
    /// status. `on_chunk(downloaded, total)` runs after every chunk; `total` is 0
    /// when the server sends no `content-length`.
    #[tracing::instrument(skip(self, create_writer, on_chunk))]
    pub async fn download_file<W, F, P>(
        &self,
        url: &str,
        create_writer: F,
        mut on_chunk: P,
    ) -> Result<DownloadOutcome>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
        P: FnMut(u64, u64),
    {
        debug!("Downloading file from {}...", url);

        // A whole-request timeout would cap large downloads, so only the
        // response head is bounded here and the body is bounded per chunk.
        let response = tokio::time::timeout(self.request_timeout, self.client.get(url).send())
            .await
            .map_err(|_| {
                anyhow!(
                    "Timed out after {}s waiting for {}",
                    self.request_timeout.as_secs_f32(),
                    url
                )
            })?
            .context("Failed to start download request")?;

        let mut response = check_status(response)?;
        let declared = response.content_length();
        let total = declared.unwrap_or(0);

        let mut writer = create_writer()?;
        let mut written: u64 = 0;

        loop {
            let chunk = tokio::time::timeout(self.stall_timeout, response.chunk())
                .await
                .map_err(|_| {
                    anyhow!(
                        "Download stalled: no data received for {}s",
                        self.stall_timeout.as_secs_f32()
                    )
                })?
                .context("Failed to read chunk from download stream")?;

            let Some(chunk) = chunk else {
                break;
            };

            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            written += chunk.len() as u64;
            on_chunk(written, total);
        }

        writer.flush().context("Failed to flush downloaded file")?;

        debug!("Downloaded {:.2} MB", written as f64 / (1024.0 * 1024.0));

        Ok(DownloadOutcome { written, declared })
    }
}
