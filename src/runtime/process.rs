//! Process operations (detached spawn, opening folders).

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn spawn_detached_impl(&self, program: &Path, cwd: &Path) -> Result<u32> {
        let child = Command::new(program)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {:?}", program))?;

        // Not waited on: the game outlives the launcher.
        Ok(child.id())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn open_path_impl(&self, path: &Path) -> Result<()> {
        open::that_detached(path).with_context(|| format!("Failed to open {:?}", path))
    }
}
