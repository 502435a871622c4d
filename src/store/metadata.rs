//! The per-version `version.meta` record and the asset-name conventions
//! it is derived from.

use serde::Serialize;

/// Value used for any field that cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// Metadata recorded for an installed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionMetadata {
    pub game_version: String,
    pub renderer: String,
    /// Name of the asset the version was installed from
    pub asset: Option<String>,
}

impl Default for VersionMetadata {
    fn default() -> Self {
        Self {
            game_version: UNKNOWN.to_string(),
            renderer: UNKNOWN.to_string(),
            asset: None,
        }
    }
}

impl VersionMetadata {
    /// Derives metadata from an asset file name such as `sm64coopdx_v1.2.3_OpenGL.zip`.
    ///
    /// The game version is the text after the first `_v` up to the next `_`;
    /// the renderer is the text after the last `_`, up to the extension.
    pub fn from_asset_name(asset_name: &str) -> Self {
        let (stem, _) = split_extension(asset_name);

        let (game_version, renderer) = match stem.find("_v") {
            Some(start) => {
                let rest = &stem[start + 2..];
                match rest.find('_') {
                    Some(end) => {
                        let tail = &rest[end..];
                        (&rest[..end], tail.rsplit('_').next().unwrap_or_default())
                    }
                    None => (rest, ""),
                }
            }
            None => ("", ""),
        };

        Self {
            game_version: or_unknown(game_version),
            renderer: or_unknown(renderer),
            asset: Some(asset_name.to_string()),
        }
    }

    /// Parses newline-separated `key=value` pairs. Unknown keys, comments and
    /// malformed lines are ignored; missing keys stay "Unknown".
    pub fn parse(content: &str) -> Self {
        let mut meta = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "game_version" => meta.game_version = or_unknown(value),
                "renderer" => meta.renderer = or_unknown(value),
                "asset" if !value.is_empty() => meta.asset = Some(value.to_string()),
                _ => {}
            }
        }

        meta
    }

    /// Serializes to the on-disk `key=value` format.
    pub fn to_file_content(&self) -> String {
        let mut out = format!(
            "game_version={}\nrenderer={}\n",
            single_line(&self.game_version),
            single_line(&self.renderer)
        );
        if let Some(asset) = &self.asset {
            out.push_str(&format!("asset={}\n", single_line(asset)));
        }
        out
    }
}

/// Splits a trailing extension off a file name.
///
/// Only an extension containing a letter counts, so `game_v1.2` keeps its
/// version digits while `game_v1.2.zip` loses `.zip`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}

fn or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        value.trim().to_string()
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_asset_name_convention() {
        let cases = [
            ("game_v1.2.3_OpenGL.zip", "1.2.3", "OpenGL"),
            ("sm64coopdx_v1.0.4_DirectX.zip", "1.0.4", "DirectX"),
            ("sm64coopdx_v1.1_Windows_OpenGL.zip", "1.1", "OpenGL"),
            ("sm64coopdx_v1.0.3_Linux_OpenGL.ZIP", "1.0.3", "OpenGL"),
        ];
        for (name, version, renderer) in cases {
            let meta = VersionMetadata::from_asset_name(name);
            assert_eq!(meta.game_version, version, "version of {}", name);
            assert_eq!(meta.renderer, renderer, "renderer of {}", name);
            assert_eq!(meta.asset.as_deref(), Some(name));
        }
    }

    #[test]
    fn test_from_asset_name_without_version_marker() {
        for name in [
            "sm64coopdx_Windows_OpenGL.zip",
            "game.zip",
            "game",
            "OpenGL_build.zip",
        ] {
            let meta = VersionMetadata::from_asset_name(name);
            assert_eq!(meta.game_version, UNKNOWN, "version of {}", name);
            assert_eq!(meta.renderer, UNKNOWN, "renderer of {}", name);
        }
    }

    #[test]
    fn test_from_asset_name_partial_convention() {
        let meta = VersionMetadata::from_asset_name("game_v1.2.zip");
        assert_eq!(meta.game_version, "1.2");
        assert_eq!(meta.renderer, UNKNOWN);

        let meta = VersionMetadata::from_asset_name("game_v_OpenGL.zip");
        assert_eq!(meta.game_version, UNKNOWN);
        assert_eq!(meta.renderer, "OpenGL");

        let meta = VersionMetadata::from_asset_name("game_v2.0_.zip");
        assert_eq!(meta.game_version, "2.0");
        assert_eq!(meta.renderer, UNKNOWN);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a_v1_GL.zip"), ("a_v1_GL", Some("zip")));
        assert_eq!(split_extension("game_v1.2"), ("game_v1.2", None));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }

    #[test]
    fn test_parse_defaults_missing_keys() {
        let meta = VersionMetadata::parse("renderer=DirectX\n");
        assert_eq!(meta.game_version, UNKNOWN);
        assert_eq!(meta.renderer, "DirectX");
        assert_eq!(meta.asset, None);

        assert_eq!(VersionMetadata::parse(""), VersionMetadata::default());
    }

    #[test]
    fn test_parse_ignores_noise() {
        let content = "# written by the launcher\n\
                       \n\
                       game_version = 1.0.4 \n\
                       not a pair\n\
                       favourite=yes\n\
                       renderer=\n\
                       asset=sm64coopdx_v1.0.4_OpenGL.zip\n";
        let meta = VersionMetadata::parse(content);
        assert_eq!(meta.game_version, "1.0.4");
        assert_eq!(meta.renderer, UNKNOWN);
        assert_eq!(meta.asset.as_deref(), Some("sm64coopdx_v1.0.4_OpenGL.zip"));
    }

    #[test]
    fn test_file_content_is_readable_back() {
        let meta = VersionMetadata {
            game_version: "1.2.3".into(),
            renderer: "Open\nGL".into(),
            asset: Some("game_v1.2.3_OpenGL.zip".into()),
        };

        let content = meta.to_file_content();
        assert_eq!(
            content,
            "game_version=1.2.3\nrenderer=Open GL\nasset=game_v1.2.3_OpenGL.zip\n"
        );
        assert_eq!(VersionMetadata::parse(&content).renderer, "Open GL");
    }
}
