mod zip;

use crate::cleanup::SharedCleanupContext;
use crate::runtime::Runtime;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub use zip::ZipExtractor;

/// Trait for format-specific archive extractors
pub trait ArchiveExtractor: Send + Sync {
    /// Extract the archive into `extract_to`, which must already exist. The
    /// staging directory is registered in `cleanup_ctx` while it exists.
    fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()>;
}

/// Staging directory used while extracting into `extract_to`.
///
/// Returns: `<parent>/.<name>.extract`
pub fn staging_dir_for(extract_to: &Path) -> PathBuf {
    let name = extract_to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract_to.with_file_name(format!(".{}.extract", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_dir_is_hidden_sibling() {
        assert_eq!(
            staging_dir_for(Path::new("/versions/game_v1.2.3_OpenGL")),
            PathBuf::from("/versions/.game_v1.2.3_OpenGL.extract")
        );
    }
}
