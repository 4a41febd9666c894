//! Registry entry types
//!
//! The registry is an external, read-only catalogue keyed by `owner/repo`.
//! Each entry is an immutable per-fetch snapshot of a repository's release
//! and commit metadata; nothing in this crate mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of a known extension repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Unique registry identifier
    pub id: String,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub name: String,

    /// `owner/name`
    pub full_name: String,

    /// Repository description
    #[serde(default)]
    pub description: Option<String>,

    /// Repository topics
    #[serde(default)]
    pub topics: Vec<String>,

    /// Latest release version with any leading `v` stripped; `None` when the
    /// repository has no release
    #[serde(default)]
    pub latest_version: Option<String>,

    /// Latest release tag as published
    #[serde(default)]
    pub latest_tag: Option<String>,

    /// HTML URL of the latest release
    #[serde(default)]
    pub latest_release_url: Option<String>,

    /// Stargazer count
    #[serde(default)]
    pub stars: u64,

    /// SPDX licence identifier
    #[serde(default)]
    pub licence: Option<String>,

    /// Repository HTML URL
    pub html_url: String,

    /// Whether the repository is a template repository
    #[serde(default)]
    pub template: bool,

    /// Rendered template description content, when available
    #[serde(default)]
    pub template_content: Option<String>,

    /// Default branch name
    #[serde(default)]
    pub default_branch_ref: Option<String>,

    /// Most recent commit hash on the default branch
    #[serde(default)]
    pub last_commit: Option<String>,
}

impl RegistryEntry {
    /// Derive `latest_version` from a release tag by stripping a leading `v`
    pub fn version_from_tag(tag: &str) -> String {
        tag.strip_prefix('v').unwrap_or(tag).to_string()
    }
}

/// A full registry snapshot keyed by `owner/repo`
pub type RegistrySnapshot = HashMap<String, RegistryEntry>;

/// Look up a registry entry by key, falling back to case-insensitive matching
pub fn lookup_entry<'a>(snapshot: &'a RegistrySnapshot, key: &str) -> Option<&'a RegistryEntry> {
    if let Some(entry) = snapshot.get(key) {
        return Some(entry);
    }
    let lowered = key.to_lowercase();
    snapshot
        .iter()
        .find(|(k, _)| k.to_lowercase() == lowered)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(full_name: &str) -> RegistryEntry {
        let (owner, name) = full_name.split_once('/').unwrap();
        RegistryEntry {
            id: full_name.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: full_name.to_string(),
            description: None,
            topics: vec![],
            latest_version: None,
            latest_tag: None,
            latest_release_url: None,
            stars: 0,
            licence: None,
            html_url: format!("https://github.com/{full_name}"),
            template: false,
            template_content: None,
            default_branch_ref: Some("main".to_string()),
            last_commit: None,
        }
    }

    #[test]
    fn test_version_from_tag() {
        assert_eq!(RegistryEntry::version_from_tag("v1.2.3"), "1.2.3");
        assert_eq!(RegistryEntry::version_from_tag("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_lookup_case_insensitive_fallback() {
        let mut snapshot = RegistrySnapshot::new();
        snapshot.insert("Quarto-Ext/lightbox".to_string(), entry("Quarto-Ext/lightbox"));

        // Exact match wins
        assert!(lookup_entry(&snapshot, "Quarto-Ext/lightbox").is_some());
        // Case-insensitive fallback
        assert!(lookup_entry(&snapshot, "quarto-ext/lightbox").is_some());
        assert!(lookup_entry(&snapshot, "quarto-ext/other").is_none());
    }
}
