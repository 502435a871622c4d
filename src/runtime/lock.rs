//! Advisory file locks.
//!
//! Lock files are never deleted, so every contender locks the same inode.

use anyhow::{Context, Result};
use fs2::FileExt;
use log::debug;
use std::fs::{File, OpenOptions};
use std::path::Path;

use super::RealRuntime;

/// An exclusive advisory lock held on a lock file.
///
/// Dropping the lock releases it. The operating system also releases it when
/// the process exits, so an interrupted install never leaves a stale claim.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("Failed to release lock: {}", e);
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn try_lock_impl(&self, path: &Path) -> Result<Option<FileLock>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {:?}", path))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(FileLock { file })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!("Lock {:?} is held by another process", path);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to lock {:?}", path)),
        }
    }
}
