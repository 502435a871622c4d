use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::runtime::Runtime;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::{ArchiveExtractor, staging_dir_for};

/// Extractor for .zip archives
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()> {
        self.extract_impl(runtime, archive_path, extract_to, cleanup_ctx)
    }
}

impl ZipExtractor {
    #[tracing::instrument(skip(self, runtime, cleanup_ctx))]
    fn extract_impl<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()> {
        debug!("Extracting zip archive to {:?}...", extract_to);
        let mut reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        // ZipArchive needs Read + Seek
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;

        let mut archive = ZipArchive::new(std::io::Cursor::new(buffer))
            .context("Failed to parse ZIP archive")?;
        if archive.is_empty() {
            bail!("Archive appears to be empty.");
        }

        // Unpack next to the target first so a single top-level directory
        // can be lifted out of the way.
        let staging_dir = staging_dir_for(extract_to);
        if runtime.exists(&staging_dir) {
            runtime.remove_dir_all(&staging_dir)?;
        }
        runtime.create_dir_all(&staging_dir)?;
        let staging = CleanupGuard::new(cleanup_ctx, staging_dir.clone());

        debug!("Unpacking to staging dir: {:?}", staging_dir);

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .with_context(|| format!("Failed to read ZIP entry {}", i))?;

            let Some(entry_path) = entry.enclosed_name() else {
                debug!("Skipping entry with unsafe path {:?}", entry.name());
                continue;
            };

            let full_path = staging_dir.join(&entry_path);

            if entry.is_dir() {
                runtime.create_dir_all(&full_path)?;
            } else {
                if let Some(parent) = full_path.parent() {
                    runtime.create_dir_all(parent)?;
                }
                let mut dest_file = runtime.create_file(&full_path)?;
                std::io::copy(&mut entry, &mut dest_file)
                    .with_context(|| format!("Failed to extract file {:?}", full_path))?;

                #[cfg(unix)]
                if let Some(mode) = entry.unix_mode()
                    && let Err(e) = runtime.set_permissions(&full_path, mode)
                {
                    debug!("Failed to set permissions on {:?}: {}", full_path, e);
                }
            }
        }

        let entries = runtime
            .read_dir(&staging_dir)
            .context("Failed to read staging directory")?;

        let source_dir = match entries.as_slice() {
            [only] if runtime.is_dir(only) => only.clone(),
            _ => staging_dir.clone(),
        };

        debug!("Moving contents from {:?} to {:?}", source_dir, extract_to);
        let mut moved = 0usize;
        for item in runtime.read_dir(&source_dir)? {
            let Some(file_name) = item.file_name() else {
                continue;
            };
            runtime.rename(&item, &extract_to.join(file_name))?;
            moved += 1;
        }
        if moved == 0 {
            bail!("Archive appears to be empty.");
        }

        runtime.remove_dir_all(&staging_dir)?;
        staging.success();

        info!("Extracted {} entries into {:?}", moved, extract_to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup;
    use crate::runtime::RealRuntime;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn create_test_archive(path: &Path, files: &[(&str, &str)]) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }

    fn extract(archive_path: &Path, extract_path: &Path) -> Result<()> {
        ZipExtractor.extract(&RealRuntime, archive_path, extract_path, cleanup::new_shared())
    }

    fn setup() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join(".build.part");
        let extract_path = dir.path().join("build");
        fs::create_dir(&extract_path).unwrap();
        (dir, archive_path, extract_path)
    }

    #[test]
    fn test_single_toplevel_dir_is_flattened() -> Result<()> {
        let (dir, archive_path, extract_path) = setup();
        create_test_archive(
            &archive_path,
            &[
                ("sm64coopdx/sm64coopdx", "binary"),
                ("sm64coopdx/mods/readme.txt", "mods"),
            ],
        )?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("sm64coopdx"))?, "binary");
        assert_eq!(
            fs::read_to_string(extract_path.join("mods/readme.txt"))?,
            "mods"
        );
        assert!(!dir.path().join(".build.extract").exists());
        Ok(())
    }

    #[test]
    fn test_multiple_toplevel_entries_are_kept() -> Result<()> {
        let (_dir, archive_path, extract_path) = setup();
        create_test_archive(
            &archive_path,
            &[("sm64coopdx", "binary"), ("lang/en.ini", "hello")],
        )?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("sm64coopdx"))?, "binary");
        assert_eq!(fs::read_to_string(extract_path.join("lang/en.ini"))?, "hello");
        Ok(())
    }

    #[test]
    fn test_single_toplevel_file_is_kept() -> Result<()> {
        let (_dir, archive_path, extract_path) = setup();
        create_test_archive(&archive_path, &[("sm64coopdx", "binary")])?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("sm64coopdx"))?, "binary");
        Ok(())
    }

    #[test]
    fn test_empty_archive_fails() {
        let (dir, archive_path, extract_path) = setup();
        create_test_archive(&archive_path, &[]).unwrap();

        let err = extract(&archive_path, &extract_path).unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(!dir.path().join(".build.extract").exists());
    }

    #[test]
    fn test_archive_with_only_empty_dir_fails() {
        let (dir, archive_path, extract_path) = setup();
        {
            let mut zip = ZipWriter::new(File::create(&archive_path).unwrap());
            let options: FileOptions<()> = FileOptions::default();
            zip.add_directory("sm64coopdx/", options).unwrap();
            zip.finish().unwrap();
        }

        let result = extract(&archive_path, &extract_path);
        assert!(result.is_err());
        assert!(!dir.path().join(".build.extract").exists());
    }

    #[test]
    fn test_corrupted_archive_fails() {
        let (_dir, archive_path, extract_path) = setup();
        fs::write(&archive_path, "<html>not a zip</html>").unwrap();

        let err = extract(&archive_path, &extract_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse ZIP archive"));
    }

    #[test]
    fn test_stale_staging_dir_is_replaced() -> Result<()> {
        let (dir, archive_path, extract_path) = setup();
        let stale = dir.path().join(".build.extract");
        fs::create_dir(&stale)?;
        fs::write(stale.join("leftover.txt"), "old")?;

        create_test_archive(&archive_path, &[("top/sm64coopdx", "binary")])?;

        extract(&archive_path, &extract_path)?;

        assert!(extract_path.join("sm64coopdx").exists());
        assert!(!extract_path.join("leftover.txt").exists());
        assert!(!stale.exists());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions_are_preserved() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, archive_path, extract_path) = setup();
        {
            let mut zip = ZipWriter::new(File::create(&archive_path)?);

            let options: FileOptions<()> = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o755);
            zip.start_file("build/sm64coopdx", options)?;
            zip.write_all(b"\x7fELF")?;

            let options: FileOptions<()> = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);
            zip.start_file("build/config.txt", options)?;
            zip.write_all(b"some config")?;

            zip.finish()?;
        }

        extract(&archive_path, &extract_path)?;

        let exe_mode = fs::metadata(extract_path.join("sm64coopdx"))?
            .permissions()
            .mode();
        assert!(exe_mode & 0o111 != 0, "executable mode was {:o}", exe_mode);

        let config_mode = fs::metadata(extract_path.join("config.txt"))?
            .permissions()
            .mode();
        assert!(config_mode & 0o111 == 0, "config mode was {:o}", config_mode);
        Ok(())
    }

    #[test]
    fn test_extract_unregisters_staging() -> Result<()> {
        let (_dir, archive_path, extract_path) = setup();
        create_test_archive(&archive_path, &[("top/sm64coopdx", "binary")])?;

        let cleanup_ctx = cleanup::new_shared();
        ZipExtractor.extract(
            &RealRuntime,
            &archive_path,
            &extract_path,
            cleanup_ctx.clone(),
        )?;

        assert!(cleanup::lock(&cleanup_ctx).paths.is_empty());
        assert!(extract_path.join("sm64coopdx").exists());
        Ok(())
    }

    #[test]
    fn test_directory_entries_are_created() -> Result<()> {
        let (_dir, archive_path, extract_path) = setup();
        {
            let mut zip = ZipWriter::new(File::create(&archive_path)?);
            let options: FileOptions<()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.add_directory("top/mods/", options)?;
            zip.add_directory("top/palettes/", options)?;
            zip.start_file("top/mods/init.lua", options)?;
            zip.write_all(b"-- mod")?;
            zip.finish()?;
        }

        extract(&archive_path, &extract_path)?;

        assert!(extract_path.join("palettes").is_dir());
        assert_eq!(fs::read_to_string(extract_path.join("mods/init.lua"))?, "-- mod");
        Ok(())
    }

    #[test]
    fn test_nonexistent_archive_fails() {
        let (_dir, archive_path, extract_path) = setup();

        let err = extract(&archive_path, &extract_path).unwrap_err();
        assert!(err.to_string().contains("Failed to open archive"));
    }
}
