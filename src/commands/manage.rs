use anyhow::Result;

use crate::{
    launcher::Launcher,
    runtime::Runtime,
    source::ReleaseSource,
    store::{VersionStore, validate_folder_name},
};

use super::config::Config;

/// Rename an installed version
#[tracing::instrument(skip(config))]
pub fn rename<R: Runtime, S: ReleaseSource>(config: Config<R, S>, old: &str, new: &str) -> Result<()> {
    let store = VersionStore::new(&config.runtime, config.root.clone());
    let version = store.rename(old, new)?;
    println!("     renamed {} -> {}", old.trim(), version.folder_name);
    Ok(())
}

/// Delete an installed version after confirmation
#[tracing::instrument(skip(config))]
pub fn delete<R: Runtime, S: ReleaseSource>(config: Config<R, S>, name: &str, yes: bool) -> Result<()> {
    let store = VersionStore::new(&config.runtime, config.root.clone());
    let version = store.get(name)?;

    if !yes {
        let prompt = format!(
            "Delete '{}' and everything in {}?",
            version.folder_name,
            store.version_dir(&version.folder_name).display()
        );
        if !config.runtime.confirm(&prompt)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    store.delete(&version.folder_name)?;
    println!("     deleted {}", version.folder_name);
    Ok(())
}

/// Start an installed version
#[tracing::instrument(skip(config))]
pub fn launch<R: Runtime, S: ReleaseSource>(config: Config<R, S>, name: &str) -> Result<()> {
    let store = VersionStore::new(&config.runtime, config.root.clone());
    let pid = Launcher::new(&store).launch(name)?;
    println!("    launched {} (pid {})", validate_folder_name(name)?, pid);
    Ok(())
}

/// Open a version folder in the file manager
#[tracing::instrument(skip(config))]
pub fn open<R: Runtime, S: ReleaseSource>(config: Config<R, S>, name: &str) -> Result<()> {
    let store = VersionStore::new(&config.runtime, config.root.clone());
    Launcher::new(&store).open_folder(name)?;
    println!("      opened {}", store.version_dir(name.trim()).display());
    Ok(())
}
