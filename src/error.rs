//! Error taxonomy surfaced by every public launcher operation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LauncherError {
    /// Release registry could not be reached or answered with an error.
    #[error("Network error: {0}")]
    Network(String),

    /// Asset stream failed, stalled, or delivered the wrong number of bytes.
    #[error("Download failed: {0}")]
    Download(String),

    /// Downloaded archive is corrupt, empty or unreadable.
    #[error("Extraction failed: {0}")]
    Extract(String),

    /// Target version name is already installed or being installed.
    #[error("Version name already in use: {0}")]
    NameConflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Launch failed: {0}")]
    Launch(String),

    #[error("Invalid version name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl LauncherError {
    /// Short, stable label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LauncherError::Network(_) => "network",
            LauncherError::Download(_) => "download",
            LauncherError::Extract(_) => "extract",
            LauncherError::NameConflict(_) => "name-conflict",
            LauncherError::NotFound(_) => "not-found",
            LauncherError::AlreadyExists(_) => "already-exists",
            LauncherError::Launch(_) => "launch",
            LauncherError::InvalidName(_) => "invalid-name",
            LauncherError::Io(_) => "io",
        }
    }

    pub(crate) fn network(err: anyhow::Error) -> Self {
        LauncherError::Network(format!("{:#}", err))
    }

    pub(crate) fn download(err: anyhow::Error) -> Self {
        LauncherError::Download(format!("{:#}", err))
    }

    pub(crate) fn extract(err: anyhow::Error) -> Self {
        LauncherError::Extract(format!("{:#}", err))
    }

    pub(crate) fn io(err: anyhow::Error) -> Self {
        LauncherError::Io(format!("{:#}", err))
    }
}
