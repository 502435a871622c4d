//! Starting installed versions and revealing their folders.

use log::info;

use crate::error::LauncherError;
use crate::runtime::Runtime;
use crate::store::{EXECUTABLE_NAME, VersionStore, validate_folder_name};

pub struct Launcher<'a, R: Runtime> {
    store: &'a VersionStore<'a, R>,
}

impl<'a, R: Runtime> Launcher<'a, R> {
    pub fn new(store: &'a VersionStore<'a, R>) -> Self {
        Self { store }
    }

    /// Starts the game from its version directory and returns the child pid.
    ///
    /// The process is detached: the launcher neither waits for it nor
    /// supervises it.
    #[tracing::instrument(skip(self))]
    pub fn launch(&self, name: &str) -> Result<u32, LauncherError> {
        let name = validate_folder_name(name)?;
        let health = self.store.health(&name);
        if !health.dir_exists {
            return Err(LauncherError::NotFound(format!("version '{}'", name)));
        }
        if !health.executable_exists {
            return Err(LauncherError::NotFound(format!(
                "{} in version '{}'",
                EXECUTABLE_NAME, name
            )));
        }

        let program = self.store.executable_path(&name);
        let cwd = self.store.version_dir(&name);
        let pid = self
            .store
            .runtime()
            .spawn_detached(&program, &cwd)
            .map_err(|e| LauncherError::Launch(format!("{:#}", e)))?;

        info!("Launched {:?} (pid {})", program, pid);
        Ok(pid)
    }

    /// Opens a version directory in the system file manager.
    #[tracing::instrument(skip(self))]
    pub fn open_folder(&self, name: &str) -> Result<(), LauncherError> {
        let name = validate_folder_name(name)?;
        let dir = self.store.version_dir(&name);
        if !self.store.runtime().is_dir(&dir) {
            return Err(LauncherError::NotFound(format!("version '{}'", name)));
        }

        self.store
            .runtime()
            .open_path(&dir)
            .map_err(|e| LauncherError::Launch(format!("{:#}", e)))
    }
}
