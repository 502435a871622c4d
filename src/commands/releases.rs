use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::{
    runtime::Runtime,
    source::{Release, ReleaseSource},
};

use super::config::Config;

/// Print the published releases and their assets
#[tracing::instrument(skip(config))]
pub async fn releases<R: Runtime, S: ReleaseSource>(config: Config<R, S>, json: bool) -> Result<()> {
    let releases = config.source.fetch_releases().await?;
    debug!("Fetched {} release(s)", releases.len());

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &releases)?;
        writeln!(out)?;
    } else {
        print_releases(&mut out, &releases)?;
    }
    Ok(())
}

pub(crate) fn print_releases<W: Write>(out: &mut W, releases: &[Release]) -> Result<()> {
    if releases.is_empty() {
        writeln!(out, "No releases found.")?;
        return Ok(());
    }

    for release in releases {
        let pre = if release.prerelease { " (pre-release)" } else { "" };
        writeln!(out, "{} [{}]{}", release.name, release.tag, pre)?;
        if release.assets.is_empty() {
            writeln!(out, "  (no assets)")?;
        }
        for asset in &release.assets {
            writeln!(out, "  {} ({})", asset.name, format_size(asset.size))?;
        }
    }
    Ok(())
}

/// Print the latest release notes as raw Markdown
#[tracing::instrument(skip(config))]
pub async fn changelog<R: Runtime, S: ReleaseSource>(config: Config<R, S>) -> Result<()> {
    let body = config.source.fetch_changelog().await?;
    if body.trim().is_empty() {
        println!("The latest release has no changelog.");
    } else {
        println!("{}", body.trim_end());
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / MB)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
