//! Download-and-extract workflow for one release asset.
//!
//! ```text
//! Idle -> Downloading -> Extracting -> Finalizing -> Done
//!   \________\______________\______________\-----> Failed
//! ```
//!
//! Every partial path an attempt creates is held by a [`CleanupGuard`], so a
//! failure in any state removes the temp archive, the staging directory and
//! the half-built version directory. The same paths sit in a shared
//! [`CleanupContext`](crate::cleanup::CleanupContext) for the Ctrl-C handler.

use log::{debug, info, warn};
use std::fmt;

use crate::archive::ArchiveExtractor;
use crate::cleanup::{self, CleanupGuard, SharedCleanupContext};
use crate::download::{SizeCheck, download_file, verify_size};
use crate::error::LauncherError;
use crate::http::HttpClient;
use crate::runtime::Runtime;
use crate::source::Asset;
use crate::store::{
    EXECUTABLE_NAME, InstalledVersion, VersionMetadata, VersionStore, resolve_folder_name,
};

/// What to install: the chosen asset and an optional folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub asset: Asset,
    /// Folder name to install into; blank means "derive from the asset name"
    pub custom_name: Option<String>,
}

impl InstallRequest {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            custom_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    Downloading,
    Extracting,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallState::Idle => "idle",
            InstallState::Downloading => "downloading",
            InstallState::Extracting => "extracting",
            InstallState::Finalizing => "finalizing",
            InstallState::Done => "done",
            InstallState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Receives install progress. All methods default to doing nothing.
pub trait InstallObserver {
    fn on_state(&mut self, _state: InstallState) {}

    /// Called after every downloaded chunk. `total` is 0 when unknown.
    fn on_progress(&mut self, _downloaded: u64, _total: u64) {}

    /// A non-fatal problem the user should hear about.
    fn on_warning(&mut self, _message: &str) {}
}

pub struct NoopObserver;

impl InstallObserver for NoopObserver {}

pub struct Installer<'a, R: Runtime, E: ArchiveExtractor> {
    store: VersionStore<'a, R>,
    http_client: HttpClient,
    extractor: E,
    cleanup_ctx: SharedCleanupContext,
}

impl<'a, R: Runtime, E: ArchiveExtractor> Installer<'a, R, E> {
    pub fn new(store: VersionStore<'a, R>, http_client: HttpClient, extractor: E) -> Self {
        Self {
            store,
            http_client,
            extractor,
            cleanup_ctx: cleanup::new_shared(),
        }
    }

    /// Share partial-install paths with an interruption handler.
    pub fn with_cleanup_context(mut self, cleanup_ctx: SharedCleanupContext) -> Self {
        self.cleanup_ctx = cleanup_ctx;
        self
    }

    pub fn store(&self) -> &VersionStore<'a, R> {
        &self.store
    }

    /// Installs `request.asset` and returns the new version.
    #[tracing::instrument(skip(self, request, observer), fields(asset = %request.asset.name))]
    pub async fn install(
        &self,
        request: &InstallRequest,
        observer: &mut dyn InstallObserver,
    ) -> Result<InstalledVersion, LauncherError> {
        observer.on_state(InstallState::Idle);

        let result = self.run(request, observer).await;
        match &result {
            Ok(version) => {
                info!("Installed {} into {:?}", request.asset.name, version.folder_name);
                observer.on_state(InstallState::Done);
            }
            Err(e) => {
                warn!("Install of {} failed: {}", request.asset.name, e);
                observer.on_state(InstallState::Failed);
            }
        }
        result
    }

    async fn run(
        &self,
        request: &InstallRequest,
        observer: &mut dyn InstallObserver,
    ) -> Result<InstalledVersion, LauncherError> {
        let asset = &request.asset;
        let runtime = self.store.runtime();

        // Nothing below touches the network until the name is ours.
        let name = resolve_folder_name(&asset.name, request.custom_name.as_deref())?;
        self.ensure_free(&name)?;
        let _lock = self.store.lock(&name)?;
        self.ensure_free(&name)?;

        let temp_archive = CleanupGuard::new(
            self.cleanup_ctx.clone(),
            self.store.temp_archive_path(&name),
        );

        observer.on_state(InstallState::Downloading);
        let outcome = download_file(
            runtime,
            &asset.download_url,
            temp_archive.path(),
            &self.http_client,
            |downloaded, total| observer.on_progress(downloaded, total),
        )
        .await
        .map_err(LauncherError::download)?;

        match verify_size(&outcome).map_err(LauncherError::download)? {
            SizeCheck::Matched => debug!("Received all {} bytes", outcome.written),
            SizeCheck::Undeclared => observer.on_warning(&format!(
                "Server did not report a size for {}; received {} bytes without verification",
                asset.name, outcome.written
            )),
        }

        observer.on_state(InstallState::Extracting);
        let version_dir = self.store.version_dir(&name);
        // Only a directory this attempt created may be removed on failure
        if !runtime.create_dir(&version_dir).map_err(LauncherError::io)? {
            return Err(LauncherError::NameConflict(format!(
                "'{}' appeared in {:?} during the install",
                name,
                self.store.root()
            )));
        }
        let target = CleanupGuard::new(self.cleanup_ctx.clone(), version_dir.clone());
        self.extractor
            .extract(
                runtime,
                temp_archive.path(),
                &version_dir,
                self.cleanup_ctx.clone(),
            )
            .map_err(LauncherError::extract)?;

        observer.on_state(InstallState::Finalizing);
        let meta = VersionMetadata::from_asset_name(&asset.name);
        self.store.write_metadata(&name, &meta)?;

        if let Err(e) = runtime.remove_file(temp_archive.path()) {
            warn!("Failed to remove temporary archive: {:#}", e);
        }
        temp_archive.success();

        if !self.store.health(&name).executable_exists {
            observer.on_warning(&format!(
                "{} was not found in '{}'; it will not be listed until the executable is present",
                EXECUTABLE_NAME, name
            ));
        }
        target.success();

        Ok(InstalledVersion {
            folder_name: name,
            game_version: meta.game_version,
            renderer: meta.renderer,
        })
    }

    fn ensure_free(&self, name: &str) -> Result<(), LauncherError> {
        if self.store.exists(name) {
            return Err(LauncherError::NameConflict(format!(
                "'{}' already exists in {:?}",
                name,
                self.store.root()
            )));
        }
        Ok(())
    }
}
