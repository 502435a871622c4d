//! Folder-name rules for installed versions.

use crate::error::LauncherError;

use super::metadata::split_extension;

/// Checks a folder name and returns it trimmed.
///
/// Names must be non-empty, contain no path separators and not start with
/// `.`, which is reserved for scratch files in the store root.
pub fn validate_folder_name(name: &str) -> Result<String, LauncherError> {
    let trimmed = name.trim();

    let problem = if trimmed.is_empty() {
        Some("name is empty")
    } else if trimmed.contains(['/', '\\']) {
        Some("name must not contain path separators")
    } else if trimmed.starts_with('.') {
        Some("name must not start with '.'")
    } else if trimmed.chars().any(char::is_control) {
        Some("name must not contain control characters")
    } else {
        None
    };

    match problem {
        Some(reason) => Err(LauncherError::InvalidName(format!("{:?}: {}", name, reason))),
        None => Ok(trimmed.to_string()),
    }
}

/// Resolves the folder an asset installs into: the custom name when one is
/// given and not blank, otherwise the asset name without its extension.
pub fn resolve_folder_name(
    asset_name: &str,
    custom_name: Option<&str>,
) -> Result<String, LauncherError> {
    match custom_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(custom) => validate_folder_name(custom),
        None => validate_folder_name(split_extension(asset_name).0),
    }
}
