use crate::http::{DownloadOutcome, HttpClient};
use crate::runtime::Runtime;
use anyhow::{Context, Result, bail};
use log::info;
use std::path::Path;

/// Result of comparing the bytes written with the size the server announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// The announced size was received exactly
    Matched,
    /// The server announced no size, so completeness is unknown
    Undeclared,
}

/// Downloads `url` into `temp_path`, calling `on_chunk(downloaded, total)`
/// after every chunk. The file is only created once the server answered.
#[tracing::instrument(skip(runtime, temp_path, http_client, on_chunk))]
pub async fn download_file<R, P>(
    runtime: &R,
    url: &str,
    temp_path: &Path,
    http_client: &HttpClient,
    on_chunk: P,
) -> Result<DownloadOutcome>
where
    R: Runtime,
    P: FnMut(u64, u64),
{
    info!("Downloading file from {}...", url);

    let outcome = http_client
        .download_file(
            url,
            || {
                runtime.create_file(temp_path).with_context(|| {
                    format!("Failed to create temporary file at {:?}", temp_path)
                })
            },
            on_chunk,
        )
        .await?;

    info!("Download complete: {} bytes", outcome.written);
    Ok(outcome)
}

/// Fails when the server announced a size and a different number of bytes arrived.
pub fn verify_size(outcome: &DownloadOutcome) -> Result<SizeCheck> {
    match outcome.declared {
        Some(declared) if declared > 0 => {
            if outcome.written != declared {
                bail!(
                    "Incomplete download: received {} of {} bytes",
                    outcome.written,
                    declared
                );
            }
            Ok(SizeCheck::Matched)
        }
        _ => Ok(SizeCheck::Undeclared),
    }
}
