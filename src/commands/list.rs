use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::{
    runtime::Runtime,
    source::ReleaseSource,
    store::{InstalledVersion, VersionEntry, VersionStore},
};

use super::config::Config;

/// List installed versions
#[tracing::instrument(skip(config))]
pub fn list<R: Runtime, S: ReleaseSource>(config: Config<R, S>, all: bool, json: bool) -> Result<()> {
    let store = VersionStore::new(&config.runtime, config.root.clone());
    debug!("Listing versions from {:?}", store.root());

    let mut out = std::io::stdout().lock();
    if all {
        let entries = store.list_all()?;
        if json {
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        } else {
            print_entries(&mut out, &entries)?;
        }
    } else {
        let versions = store.list()?;
        if json {
            serde_json::to_writer_pretty(&mut out, &versions)?;
            writeln!(out)?;
        } else {
            print_versions(&mut out, &versions)?;
        }
    }
    Ok(())
}

pub(crate) fn print_versions<W: Write>(out: &mut W, versions: &[InstalledVersion]) -> Result<()> {
    if versions.is_empty() {
        writeln!(out, "No versions installed.")?;
        return Ok(());
    }
    for v in versions {
        writeln!(out, "{}  {} ({})", v.folder_name, v.game_version, v.renderer)?;
    }
    Ok(())
}

pub(crate) fn print_entries<W: Write>(out: &mut W, entries: &[VersionEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(out, "No version directories found.")?;
        return Ok(());
    }
    for entry in entries {
        let h = &entry.health;
        let status = if h.is_valid() {
            "ok"
        } else {
            "missing executable"
        };
        let meta = if h.metadata_exists { "" } else { ", no metadata" };
        writeln!(out, "{}  [{}{}]", entry.folder_name, status, meta)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VersionHealth;

    #[test]
    fn test_print_versions() {
        let versions = vec![InstalledVersion {
            folder_name: "stable".into(),
            game_version: "1.0.4".into(),
            renderer: "OpenGL".into(),
        }];

        let mut out = Vec::new();
        print_versions(&mut out, &versions).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "stable  1.0.4 (OpenGL)\n");

        let mut out = Vec::new();
        print_versions(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No versions installed.\n");
    }

    #[test]
    fn test_print_entries() {
        let entries = vec![
            VersionEntry {
                folder_name: "broken".into(),
                health: VersionHealth {
                    dir_exists: true,
                    executable_exists: false,
                    metadata_exists: false,
                },
            },
            VersionEntry {
                folder_name: "stable".into(),
                health: VersionHealth {
                    dir_exists: true,
                    executable_exists: true,
                    metadata_exists: true,
                },
            },
        ];

        let mut out = Vec::new();
        print_entries(&mut out, &entries).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "broken  [missing executable, no metadata]\nstable  [ok]\n"
        );
    }
}
