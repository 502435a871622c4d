use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Directory name used under the platform data directory.
const APP_DIR: &str = "coopdx-launcher";

/// Get the default versions root directory
///
/// Returns: `<data_dir>/coopdx-launcher/versions`, or
/// `~/.coopdx-launcher/versions` when the platform has no data directory.
#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if let Some(data_dir) = runtime.data_dir() {
        return Ok(data_dir.join(APP_DIR).join("versions"));
    }

    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(format!(".{}", APP_DIR)).join("versions"))
}
