//! Local store of installed game versions.
//!
//! Every version lives in its own directory under the store root:
//!
//! ```text
//! <root>/
//!   <folder_name>/
//!     sm64coopdx          game executable (sm64coopdx.exe on Windows)
//!     version.meta        key=value metadata
//!   .<folder_name>.part     download in progress
//!   .<folder_name>.extract  extraction staging
//!   .<folder_name>.lock     install lock
//! ```
//!
//! Dot-prefixed entries are scratch space and never show up as versions.

mod metadata;
mod naming;

use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::LauncherError;
use crate::runtime::{FileLock, Runtime};

pub use metadata::{UNKNOWN, VersionMetadata, split_extension};
pub use naming::{resolve_folder_name, validate_folder_name};

/// File name of the game executable inside a version directory.
#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "sm64coopdx.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "sm64coopdx";

/// File name of the metadata record inside a version directory.
pub const METADATA_FILE: &str = "version.meta";

/// A runnable installed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    pub folder_name: String,
    pub game_version: String,
    pub renderer: String,
}

/// On-disk state of a version directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VersionHealth {
    pub dir_exists: bool,
    pub executable_exists: bool,
    pub metadata_exists: bool,
}

impl VersionHealth {
    /// A version is usable when its directory and executable exist.
    pub fn is_valid(&self) -> bool {
        self.dir_exists && self.executable_exists
    }
}

/// A version directory as found on disk, valid or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub folder_name: String,
    pub health: VersionHealth,
}

/// Exclusive claim on a folder name while an install or rename is running.
#[derive(Debug)]
pub struct NameLock {
    _lock: FileLock,
}

pub struct VersionStore<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> VersionStore<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime(&self) -> &'a R {
        self.runtime
    }

    /// Returns: `<root>/<name>`
    pub fn version_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns: `<root>/<name>/<EXECUTABLE_NAME>`
    pub fn executable_path(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(EXECUTABLE_NAME)
    }

    /// Returns: `<root>/<name>/version.meta`
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(METADATA_FILE)
    }

    /// Returns: `<root>/.<name>.part`
    pub fn temp_archive_path(&self, name: &str) -> PathBuf {
        self.scratch_path(name, "part")
    }

    /// Returns: `<root>/.<name>.lock`
    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.scratch_path(name, "lock")
    }

    fn scratch_path(&self, name: &str, suffix: &str) -> PathBuf {
        self.root.join(format!(".{}.{}", name, suffix))
    }

    /// Creates the store root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<(), LauncherError> {
        if !self.runtime.exists(&self.root) {
            debug!("Creating version root {:?}", self.root);
            self.runtime
                .create_dir_all(&self.root)
                .map_err(LauncherError::io)?;
        }
        Ok(())
    }

    /// Whether anything already occupies `name` in the root.
    pub fn exists(&self, name: &str) -> bool {
        self.runtime.exists(&self.version_dir(name))
    }

    pub fn health(&self, name: &str) -> VersionHealth {
        VersionHealth {
            dir_exists: self.runtime.is_dir(&self.version_dir(name)),
            executable_exists: self.runtime.is_file(&self.executable_path(name)),
            metadata_exists: self.runtime.is_file(&self.metadata_path(name)),
        }
    }

    /// All valid versions, sorted by folder name.
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<InstalledVersion>, LauncherError> {
        let versions = self
            .list_all()?
            .into_iter()
            .filter(|entry| entry.health.is_valid())
            .map(|entry| self.installed_version(&entry.folder_name))
            .collect();
        Ok(versions)
    }

    /// Every non-hidden directory in the root with its health, sorted by name.
    #[tracing::instrument(skip(self))]
    pub fn list_all(&self) -> Result<Vec<VersionEntry>, LauncherError> {
        self.ensure_root()?;

        let mut entries = Vec::new();
        for path in self.runtime.read_dir(&self.root).map_err(LauncherError::io)? {
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && !name.starts_with('.')
                && self.runtime.is_dir(&path)
            {
                entries.push(VersionEntry {
                    folder_name: name.to_string(),
                    health: self.health(name),
                });
            }
        }

        entries.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
        debug!("Found {} version directories in {:?}", entries.len(), self.root);
        Ok(entries)
    }

    /// Looks up one installed directory, valid or not.
    pub fn get(&self, name: &str) -> Result<InstalledVersion, LauncherError> {
        let name = validate_folder_name(name)?;
        if !self.runtime.is_dir(&self.version_dir(&name)) {
            return Err(LauncherError::NotFound(format!("version '{}'", name)));
        }
        Ok(self.installed_version(&name))
    }

    fn installed_version(&self, name: &str) -> InstalledVersion {
        let meta = self.read_metadata(name);
        InstalledVersion {
            folder_name: name.to_string(),
            game_version: meta.game_version,
            renderer: meta.renderer,
        }
    }

    /// Removes a version directory and everything in it, unless an install
    /// into it is still running.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, name: &str) -> Result<(), LauncherError> {
        let name = validate_folder_name(name)?;
        let dir = self.version_dir(&name);
        if !self.runtime.is_dir(&dir) {
            return Err(LauncherError::NotFound(format!("version '{}'", name)));
        }
        let _lock = self.lock(&name)?;

        self.runtime.remove_dir_all(&dir).map_err(LauncherError::io)?;
        debug!("Deleted {:?}", dir);
        Ok(())
    }

    /// Renames a version directory in place. Neither name may be claimed by
    /// a running install.
    #[tracing::instrument(skip(self))]
    pub fn rename(&self, old: &str, new: &str) -> Result<InstalledVersion, LauncherError> {
        let old = validate_folder_name(old)?;
        let new = validate_folder_name(new)?;

        let from = self.version_dir(&old);
        if !self.runtime.is_dir(&from) {
            return Err(LauncherError::NotFound(format!("version '{}'", old)));
        }
        if old == new {
            return Ok(self.installed_version(&old));
        }

        // On case-insensitive file systems "Foo" -> "foo" finds the source at
        // the destination; both names also share one lock file there.
        let to = self.version_dir(&new);
        let case_only = old.to_lowercase() == new.to_lowercase() && self.same_entry(&from, &to);

        let _old_lock = self.lock(&old)?;
        let _new_lock = if case_only {
            None
        } else {
            Some(self.lock(&new)?)
        };

        if !self.runtime.is_dir(&from) {
            return Err(LauncherError::NotFound(format!("version '{}'", old)));
        }
        if !case_only && self.runtime.exists(&to) {
            return Err(LauncherError::AlreadyExists(format!("version '{}'", new)));
        }

        self.runtime.rename(&from, &to).map_err(LauncherError::io)?;
        debug!("Renamed {:?} to {:?}", from, to);
        Ok(self.installed_version(&new))
    }

    fn same_entry(&self, a: &Path, b: &Path) -> bool {
        match (self.runtime.canonicalize(a), self.runtime.canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Overwrites the metadata record of `name`.
    pub fn write_metadata(&self, name: &str, meta: &VersionMetadata) -> Result<(), LauncherError> {
        let path = self.metadata_path(name);
        self.runtime
            .write(&path, meta.to_file_content().as_bytes())
            .map_err(LauncherError::io)
    }

    /// Reads the metadata record of `name`. A missing or unreadable file
    /// yields "Unknown" fields.
    pub fn read_metadata(&self, name: &str) -> VersionMetadata {
        let path = self.metadata_path(name);
        if !self.runtime.is_file(&path) {
            return VersionMetadata::default();
        }

        match self.runtime.read_to_string(&path) {
            Ok(content) => VersionMetadata::parse(&content),
            Err(e) => {
                warn!("Failed to read {:?}: {:#}", path, e);
                VersionMetadata::default()
            }
        }
    }

    /// Claims `name` for an install. Fails with `NameConflict` while another
    /// process holds the claim.
    #[tracing::instrument(skip(self))]
    pub fn lock(&self, name: &str) -> Result<NameLock, LauncherError> {
        self.ensure_root()?;

        let path = self.lock_path(name);
        match self.runtime.try_lock(&path).map_err(LauncherError::io)? {
            Some(lock) => Ok(NameLock { _lock: lock }),
            None => Err(LauncherError::NameConflict(format!(
                "'{}' is in use by another process",
                name
            ))),
        }
    }
}
