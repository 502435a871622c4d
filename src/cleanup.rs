use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Partial install state to remove if the launcher is interrupted.
#[derive(Default)]
pub struct CleanupContext {
    #[cfg(test)]
    pub paths: Vec<PathBuf>,
    #[cfg(not(test))]
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path to be cleaned up on interruption
    pub fn add(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Remove a path from the cleanup list once it is no longer partial
    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    /// Delete all registered paths, newest first
    pub fn cleanup(&self) {
        for path in self.paths.iter().rev() {
            remove_path(path);
        }
    }
}

fn remove_path(path: &Path) {
    debug!("Cleaning up: {:?}", path);
    if path.is_dir() {
        let _ = std::fs::remove_dir_all(path);
    } else if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

/// Locks the context, recovering it if a panicking thread poisoned it.
pub fn lock(ctx: &SharedCleanupContext) -> MutexGuard<'_, CleanupContext> {
    ctx.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers a partial path for the lifetime of an operation.
///
/// Dropping the guard without calling [`CleanupGuard::success`] deletes the
/// path, so every early return of a failed install removes what it created.
pub struct CleanupGuard {
    ctx: SharedCleanupContext,
    path: PathBuf,
}

impl CleanupGuard {
    pub fn new(ctx: SharedCleanupContext, path: PathBuf) -> Self {
        lock(&ctx).add(path.clone());
        Self { ctx, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the path and stop tracking it
    pub fn success(self) {
        lock(&self.ctx).remove(&self.path);
        std::mem::forget(self);
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        remove_path(&self.path);
        lock(&self.ctx).remove(&self.path);
    }
}
