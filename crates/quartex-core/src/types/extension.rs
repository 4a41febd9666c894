//! Extension identifiers and discovered/installed extension records

use crate::error::{Error, Result};
use crate::manifest::ExtensionManifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier for an extension: an optional owner plus a name
///
/// Formatted as `owner/name` or bare `name`. Equality is case-sensitive as
/// stored; registry and update lookups fall back to case-insensitive key
/// matching separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId {
    /// Owner segment, `None` for name-only extensions
    pub owner: Option<String>,

    /// Extension name
    pub name: String,
}

impl ExtensionId {
    /// Create an id with an owner
    pub fn owned(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            name: name.into(),
        }
    }

    /// Create an ownerless id
    pub fn unowned(name: impl Into<String>) -> Self {
        Self {
            owner: None,
            name: name.into(),
        }
    }

    /// Relative directory of this extension under `_extensions/`
    pub fn relative_dir(&self) -> PathBuf {
        match &self.owner {
            Some(owner) => PathBuf::from(owner).join(&self.name),
            None => PathBuf::from(&self.name),
        }
    }
}

impl std::fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}/{}", owner, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parse an extension id, rejecting input with more than one `/`
///
/// This is the strict counterpart to `parse_install_source`: where the
/// lenient parser treats multi-slash input as a local path, this one surfaces
/// it as a validation failure. The two entry points serve different call
/// sites and are intentionally not unified.
pub fn parse_extension_id(raw: &str) -> Result<ExtensionId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::version("extension id must not be empty"));
    }

    let segments: Vec<&str> = raw.split('/').collect();
    match segments.as_slice() {
        [name] => Ok(ExtensionId::unowned(*name)),
        [owner, name] if !owner.is_empty() && !name.is_empty() => {
            Ok(ExtensionId::owned(*owner, *name))
        }
        _ => Err(Error::version(format!(
            "invalid extension id '{}': expected 'name' or 'owner/name'",
            raw
        ))),
    }
}

/// An extension manifest found while walking a staged tree
///
/// Produced by the discoverer; ordering across a scan is not significant and
/// callers de-duplicate by `id` where needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredExtension {
    /// Identifier derived from the directory layout (grandchild = owner/name)
    pub id: ExtensionId,

    /// Path of the extension directory relative to the staged root
    pub relative_path: PathBuf,

    /// Absolute path of the extension directory
    pub extension_dir: PathBuf,
}

/// An extension installed in a project, as seen by a single scan
///
/// Recreated on every project scan; identity is not stable across scans, so
/// consumers compare by `id`.
#[derive(Debug, Clone)]
pub struct InstalledExtension {
    /// Extension identifier
    pub id: ExtensionId,

    /// Extension directory inside the project's `_extensions/`
    pub directory: PathBuf,

    /// Path of the manifest file that was read
    pub manifest_path: PathBuf,

    /// Parsed manifest content
    pub manifest: ExtensionManifest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extension_id_bare_name() {
        let id = parse_extension_id("lightbox").unwrap();
        assert_eq!(id, ExtensionId::unowned("lightbox"));
        assert_eq!(id.to_string(), "lightbox");
    }

    #[test]
    fn test_parse_extension_id_owner_name() {
        let id = parse_extension_id("quarto-ext/lightbox").unwrap();
        assert_eq!(id, ExtensionId::owned("quarto-ext", "lightbox"));
        assert_eq!(id.to_string(), "quarto-ext/lightbox");
    }

    #[test]
    fn test_parse_extension_id_rejects_multi_slash() {
        // The strict parser errors where parse_install_source falls back to
        // a local path
        assert!(parse_extension_id("a/b/c").is_err());
        assert!(parse_extension_id("").is_err());
        assert!(parse_extension_id("/name").is_err());
    }

    #[test]
    fn test_relative_dir() {
        assert_eq!(
            ExtensionId::owned("acme", "theme").relative_dir(),
            PathBuf::from("acme/theme")
        );
        assert_eq!(
            ExtensionId::unowned("theme").relative_dir(),
            PathBuf::from("theme")
        );
    }
}
