//! Extension manifest (`_extension.yml`) parsing
//!
//! The manifest is a read-only YAML input describing an extension's title,
//! version, and contributions. Plural contribution keys (`filters`,
//! `shortcodes`, ...) normalise to singular kind names for display. The only
//! write path is `stamp_manifest_source`, which records provenance
//! (`owner/repo@ref`) after an install so later update checks can resolve a
//! registry entry.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Manifest filename candidates, in preference order
pub const MANIFEST_CANDIDATES: &[&str] = &["_extension.yml", "_extension.yaml"];

/// Parsed `_extension.yml` content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Human-readable extension title
    #[serde(default)]
    pub title: Option<String>,

    /// Author name
    #[serde(default)]
    pub author: Option<String>,

    /// Extension version string (usually semver)
    #[serde(default)]
    pub version: Option<String>,

    /// Declared contributions
    #[serde(default)]
    pub contributes: Option<Contributes>,

    /// Free-text provenance, typically `owner/repo@ref`
    #[serde(default)]
    pub source: Option<String>,

    /// Minimum Quarto version requirement (semver range)
    #[serde(default, rename = "quarto-required")]
    pub quarto_required: Option<String>,
}

/// The `contributes` section of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributes {
    /// Lua filter files
    #[serde(default)]
    pub filters: Vec<String>,

    /// Shortcode files
    #[serde(default)]
    pub shortcodes: Vec<String>,

    /// Format definitions (format name -> options)
    #[serde(default)]
    pub formats: Option<serde_yaml_ng::Value>,

    /// Metadata merged into the consuming project, including brand declarations
    #[serde(default)]
    pub metadata: Option<serde_yaml_ng::Value>,

    /// Any other contribution kinds the manifest declares
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml_ng::Value>,
}

impl Contributes {
    /// Singular display names of the contribution kinds present
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds = Vec::new();
        if !self.filters.is_empty() {
            kinds.push("filter".to_string());
        }
        if !self.shortcodes.is_empty() {
            kinds.push("shortcode".to_string());
        }
        if self.formats.is_some() {
            kinds.push("format".to_string());
        }
        if self.metadata.is_some() {
            kinds.push("metadata".to_string());
        }
        for key in self.other.keys() {
            kinds.push(singular_kind(key));
        }
        kinds
    }
}

/// Normalise a plural contribution key to its singular display name
fn singular_kind(key: &str) -> String {
    key.strip_suffix('s').unwrap_or(key).to_string()
}

impl ExtensionManifest {
    /// The brand file this extension declares via
    /// `contributes.metadata.project.brand`, if any
    pub fn declared_brand(&self) -> Option<String> {
        let metadata = self.contributes.as_ref()?.metadata.as_ref()?;
        metadata
            .get("project")?
            .get("brand")?
            .as_str()
            .map(str::to_string)
    }
}

/// Parse a manifest from YAML text
pub fn parse_manifest_str(content: &str, origin: &Path) -> Result<ExtensionManifest> {
    serde_yaml_ng::from_str(content).map_err(|e| Error::manifest(origin, e.to_string()))
}

/// Locate and parse the manifest inside an extension directory
///
/// Candidates are tried in the fixed order `_extension.yml`, `_extension.yaml`,
/// stopping at the first readable and parsable file.
pub fn parse_manifest(extension_dir: &Path) -> Result<ExtensionManifest> {
    for candidate in MANIFEST_CANDIDATES {
        let path = extension_dir.join(candidate);
        if !path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::manifest(&path, e.to_string()))?;
        return parse_manifest_str(&content, &path);
    }
    Err(Error::manifest(
        extension_dir,
        "no _extension.yml or _extension.yaml found",
    ))
}

/// Find the manifest file path inside an extension directory
pub fn find_manifest(extension_dir: &Path) -> Option<std::path::PathBuf> {
    MANIFEST_CANDIDATES
        .iter()
        .map(|c| extension_dir.join(c))
        .find(|p| p.is_file())
}

/// Write or replace the `source:` line in an installed manifest
///
/// Line-based rewrite: an existing top-level `source:` line is replaced in
/// place, otherwise the line is appended. This is a collaborator side-effect
/// run after install, not part of the reconciliation itself.
pub fn stamp_manifest_source(manifest_path: &Path, source: &str) -> Result<()> {
    let content = std::fs::read_to_string(manifest_path)
        .map_err(|e| Error::manifest(manifest_path, e.to_string()))?;

    let stamped_line = format!("source: {}", source);
    let mut lines: Vec<String> = Vec::new();
    let mut replaced = false;

    for line in content.lines() {
        if !replaced && line.starts_with("source:") {
            lines.push(stamped_line.clone());
            replaced = true;
        } else {
            lines.push(line.to_string());
        }
    }
    if !replaced {
        lines.push(stamped_line);
    }

    debug!("Stamping manifest source '{}' into {:?}", source, manifest_path);
    std::fs::write(manifest_path, lines.join("\n") + "\n")
        .map_err(|e| Error::manifest(manifest_path, e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
title: Lightbox
author: Quarto Team
version: 1.0.0
quarto-required: ">=1.3.0"
contributes:
  filters:
    - lightbox.lua
  shortcodes:
    - shortcode.lua
"#;

    #[test]
    fn test_parse_manifest_str() {
        let manifest = parse_manifest_str(SAMPLE, Path::new("_extension.yml")).unwrap();
        assert_eq!(manifest.title.as_deref(), Some("Lightbox"));
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        assert_eq!(manifest.quarto_required.as_deref(), Some(">=1.3.0"));

        let kinds = manifest.contributes.unwrap().kinds();
        assert!(kinds.contains(&"filter".to_string()));
        assert!(kinds.contains(&"shortcode".to_string()));
    }

    #[test]
    fn test_manifest_candidate_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("_extension.yaml"), "title: Yaml").unwrap();
        fs::write(temp.path().join("_extension.yml"), "title: Yml").unwrap();

        // .yml wins over .yaml
        let manifest = parse_manifest(temp.path()).unwrap();
        assert_eq!(manifest.title.as_deref(), Some("Yml"));
    }

    #[test]
    fn test_declared_brand() {
        let content = r#"
title: Theme
contributes:
  metadata:
    project:
      brand: brand.yml
"#;
        let manifest = parse_manifest_str(content, Path::new("_extension.yml")).unwrap();
        assert_eq!(manifest.declared_brand().as_deref(), Some("brand.yml"));
    }

    #[test]
    fn test_stamp_source_replaces_existing_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("_extension.yml");
        fs::write(&path, "title: X\nsource: old/repo@v0.1.0\nversion: 1.0.0\n").unwrap();

        stamp_manifest_source(&path, "acme/theme@v1.0.0").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("source: acme/theme@v1.0.0"));
        assert!(!content.contains("old/repo"));
    }

    #[test]
    fn test_stamp_source_appends_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("_extension.yml");
        fs::write(&path, "title: X\n").unwrap();

        stamp_manifest_source(&path, "acme/theme@abc1234").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("source: acme/theme@abc1234\n"));
    }
}
