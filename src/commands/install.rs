use anyhow::{Result, anyhow};
use log::info;

use crate::{
    archive::ZipExtractor,
    cleanup::{self, SharedCleanupContext},
    error::LauncherError,
    install::{InstallObserver, InstallRequest, Installer},
    runtime::Runtime,
    source::{Asset, Release, ReleaseSource, find_release},
    store::{InstalledVersion, VersionStore},
};

use super::config::Config;
use super::progress::ProgressObserver;

/// What the user asked to install.
#[derive(Debug, Clone, Default)]
pub struct InstallArgs {
    /// Release name or tag; the newest release when absent
    pub release: Option<String>,
    /// Asset file name; required when the release has several assets
    pub asset: Option<String>,
    /// Folder to install into
    pub name: Option<String>,
}

/// Download, extract and register one release asset
#[tracing::instrument(skip(config))]
pub async fn install<R: Runtime, S: ReleaseSource>(
    config: Config<R, S>,
    args: InstallArgs,
) -> Result<()> {
    let mut observer = ProgressObserver::new();
    let version = run(&config, &args, &mut observer).await?;
    println!(
        "   installed {} {}",
        version.folder_name,
        config.root.join(&version.folder_name).display()
    );
    Ok(())
}

pub(crate) async fn run<R: Runtime, S: ReleaseSource>(
    config: &Config<R, S>,
    args: &InstallArgs,
    observer: &mut dyn InstallObserver,
) -> Result<InstalledVersion> {
    let releases = config.source.fetch_releases().await?;
    let release = select_release(&releases, args.release.as_deref())?;
    let asset = select_asset(release, args.asset.as_deref())?;
    info!("Selected {} from release {}", asset.name, release.tag);

    let request = InstallRequest {
        asset: asset.clone(),
        custom_name: args.name.clone(),
    };

    let cleanup_ctx = cleanup::new_shared();
    let ctrl_c_handler = spawn_interrupt_handler(cleanup_ctx.clone());

    let store = VersionStore::new(&config.runtime, config.root.clone());
    let installer = Installer::new(store, config.http_client.clone(), ZipExtractor)
        .with_cleanup_context(cleanup_ctx);
    let result = installer.install(&request, observer).await;

    ctrl_c_handler.abort();
    Ok(result?)
}

/// Removes registered partial paths and exits with 130 on Ctrl-C.
fn spawn_interrupt_handler(cleanup_ctx: SharedCleanupContext) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            cleanup::lock(&cleanup_ctx).cleanup();
            // The OS releases the name lock; its file stays for the next install
            std::process::exit(130);
        }
    })
}

fn select_release<'a>(releases: &'a [Release], query: Option<&str>) -> Result<&'a Release> {
    match query {
        Some(query) => find_release(releases, query).ok_or_else(|| {
            let available: Vec<_> = releases.iter().take(5).map(|r| r.tag.as_str()).collect();
            anyhow!(LauncherError::NotFound(format!(
                "release '{}' (recent: {})",
                query,
                available.join(", ")
            )))
        }),
        None => releases
            .first()
            .ok_or_else(|| anyhow!(LauncherError::NotFound("no releases published".into()))),
    }
}

fn select_asset<'a>(release: &'a Release, name: Option<&str>) -> Result<&'a Asset> {
    match (name, release.assets.as_slice()) {
        (Some(name), _) => release.find_asset(name).ok_or_else(|| {
            anyhow!(LauncherError::NotFound(format!(
                "asset '{}' in release {}",
                name, release.tag
            )))
        }),
        (None, [only]) => Ok(only),
        (None, []) => Err(anyhow!(LauncherError::NotFound(format!(
            "assets in release {}",
            release.tag
        )))),
        (None, assets) => {
            let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
            Err(anyhow!(
                "Release {} has {} assets; choose one with --asset: {}",
                release.tag,
                assets.len(),
                names.join(", ")
            ))
        }
    }
}
