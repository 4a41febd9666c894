//! Update detection
//!
//! Matches each installed extension's recorded `source` against the registry
//! snapshot and decides, per extension, between two mutually exclusive
//! comparison modes. A source pinned to a short commit hash compares hashes
//! with the registry's last commit and never consults semver; everything
//! else coerces both sides to semver and compares. An extension whose
//! versions cannot be coerced is skipped silently rather than reported as an
//! error.

use quartex_core::types::registry::{lookup_entry, RegistryEntry, RegistrySnapshot};
use quartex_core::types::source::parse_version_spec;
use quartex_core::types::{ExtensionId, InstalledExtension, VersionSpec};
use semver::Version;
use tracing::debug;

/// How an update was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Short commit hash differs from the registry's last commit
    Commit,
    /// Registry's latest version is semver-greater than the installed one
    Semver,
}

/// One available update
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    pub id: ExtensionId,
    /// The `source` string recorded in the installed manifest
    pub source: String,
    /// Installed version, or short commit hash in commit mode
    pub installed: String,
    /// Version or commit the registry offers instead
    pub available: String,
    pub mode: UpdateMode,
}

/// Split a recorded source into its `owner/repo` part and optional ref
fn split_source(source: &str) -> (&str, Option<&str>) {
    match source.rfind('@') {
        Some(idx) if idx > 0 => (&source[..idx], Some(&source[idx + 1..])),
        _ => (source, None),
    }
}

/// Coerce a loose version string into strict semver
///
/// Strips a leading `v` and pads missing minor/patch components, so `v1.2`
/// compares as `1.2.0`.
fn coerce_semver(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    if raw.is_empty() {
        return None;
    }
    let dots = raw.split('.').count();
    let padded = match dots {
        1 => format!("{raw}.0.0"),
        2 => format!("{raw}.0"),
        _ => raw.to_string(),
    };
    Version::parse(&padded).ok()
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(7).collect::<String>().to_lowercase()
}

fn check_one(
    extension: &InstalledExtension,
    registry: &RegistrySnapshot,
) -> Option<UpdateInfo> {
    let source = extension.manifest.source.as_deref()?;
    let (repo_key, source_ref) = split_source(source);

    let entry = lookup_entry(registry, repo_key)?;

    // Commit mode wins when the pinned ref is hash-shaped and the registry
    // knows the branch head; it never falls through to semver
    if let Some(VersionSpec::Commit(pinned)) =
        source_ref.map(parse_version_spec)
    {
        let last_commit = entry.last_commit.as_deref()?;
        let installed = short_hash(&pinned);
        let available = short_hash(last_commit);
        if installed == available {
            return None;
        }
        return Some(UpdateInfo {
            id: extension.id.clone(),
            source: source.to_string(),
            installed,
            available,
            mode: UpdateMode::Commit,
        });
    }

    let latest_raw = entry
        .latest_version
        .clone()
        .or_else(|| entry.latest_tag.as_deref().map(RegistryEntry::version_from_tag))?;
    let installed_raw = extension.manifest.version.as_deref()?;

    let (Some(installed), Some(latest)) =
        (coerce_semver(installed_raw), coerce_semver(&latest_raw))
    else {
        debug!(
            "Skipping {}: versions {:?} / {:?} are not semver-coercible",
            extension.id, installed_raw, latest_raw
        );
        return None;
    };

    if latest > installed {
        return Some(UpdateInfo {
            id: extension.id.clone(),
            source: source.to_string(),
            installed: installed.to_string(),
            available: latest.to_string(),
            mode: UpdateMode::Semver,
        });
    }
    None
}

/// Check every installed extension for an available update
///
/// Extensions with no recorded source, no registry entry, or versions
/// outside both comparison modes are omitted, never errors.
pub fn check_for_updates(
    installed: &[InstalledExtension],
    registry: &RegistrySnapshot,
) -> Vec<UpdateInfo> {
    installed
        .iter()
        .filter_map(|extension| check_one(extension, registry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartex_core::manifest::ExtensionManifest;
    use quartex_core::types::RegistryEntry;
    use std::path::PathBuf;

    fn installed(
        id: &str,
        source: Option<&str>,
        version: Option<&str>,
    ) -> InstalledExtension {
        InstalledExtension {
            id: quartex_core::types::extension::parse_extension_id(id).unwrap(),
            directory: PathBuf::from("/project/_extensions").join(id),
            manifest_path: PathBuf::from("/project/_extensions")
                .join(id)
                .join("_extension.yml"),
            manifest: ExtensionManifest {
                title: None,
                author: None,
                version: version.map(str::to_string),
                contributes: None,
                source: source.map(str::to_string),
                quarto_required: None,
            },
        }
    }

    fn registry_entry(
        key: &str,
        latest_tag: Option<&str>,
        last_commit: Option<&str>,
    ) -> RegistrySnapshot {
        let (owner, name) = key.split_once('/').unwrap();
        let mut snapshot = RegistrySnapshot::new();
        snapshot.insert(
            key.to_string(),
            RegistryEntry {
                id: key.to_string(),
                owner: owner.to_string(),
                name: name.to_string(),
                full_name: key.to_string(),
                description: None,
                topics: vec![],
                latest_version: latest_tag.map(RegistryEntry::version_from_tag),
                latest_tag: latest_tag.map(str::to_string),
                latest_release_url: None,
                stars: 0,
                licence: None,
                html_url: format!("https://github.com/{key}"),
                template: false,
                template_content: None,
                default_branch_ref: Some("main".to_string()),
                last_commit: last_commit.map(str::to_string),
            },
        );
        snapshot
    }

    #[test]
    fn test_semver_update_detected() {
        let registry = registry_entry("acme/theme", Some("v2.1.0"), None);
        let exts = vec![installed("acme/theme", Some("acme/theme"), Some("1.0.0"))];

        let updates = check_for_updates(&exts, &registry);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].mode, UpdateMode::Semver);
        assert_eq!(updates[0].installed, "1.0.0");
        assert_eq!(updates[0].available, "2.1.0");
    }

    #[test]
    fn test_up_to_date_semver_is_quiet() {
        let registry = registry_entry("acme/theme", Some("v1.0.0"), None);
        let exts = vec![installed("acme/theme", Some("acme/theme"), Some("1.0.0"))];
        assert!(check_for_updates(&exts, &registry).is_empty());
    }

    #[test]
    fn test_loose_versions_are_coerced_before_comparing() {
        let registry = registry_entry("acme/theme", Some("v1.2"), None);
        let exts = vec![installed("acme/theme", Some("acme/theme"), Some("1.1"))];

        let updates = check_for_updates(&exts, &registry);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].available, "1.2.0");
    }

    #[test]
    fn test_uncoercible_version_skips_silently() {
        let registry = registry_entry("acme/theme", Some("v2.0.0"), None);
        let exts = vec![installed(
            "acme/theme",
            Some("acme/theme"),
            Some("not-a-version"),
        )];
        assert!(check_for_updates(&exts, &registry).is_empty());
    }

    #[test]
    fn test_commit_pin_bypasses_semver_entirely() {
        // Manifest version is far ahead of the registry, but the pinned
        // commit differs from the branch head, so an update is reported
        let registry =
            registry_entry("acme/theme", Some("v1.0.0"), Some("deadbeef0123456789ab"));
        let exts = vec![installed(
            "acme/theme",
            Some("acme/theme@abc1234"),
            Some("99.0.0"),
        )];

        let updates = check_for_updates(&exts, &registry);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].mode, UpdateMode::Commit);
        assert_eq!(updates[0].installed, "abc1234");
        assert_eq!(updates[0].available, "deadbee");
    }

    #[test]
    fn test_matching_commit_reports_no_update_despite_lower_semver() {
        let registry =
            registry_entry("acme/theme", Some("v9.0.0"), Some("ABC1234FFFFFFFFFFFFF"));
        let exts = vec![installed(
            "acme/theme",
            Some("acme/theme@abc1234"),
            Some("1.0.0"),
        )];

        // Hash comparison is case-insensitive and wins over semver
        assert!(check_for_updates(&exts, &registry).is_empty());
    }

    #[test]
    fn test_tag_pin_uses_semver_not_commit_mode() {
        let registry =
            registry_entry("acme/theme", Some("v2.0.0"), Some("deadbeef0123456789ab"));
        let exts = vec![installed(
            "acme/theme",
            Some("acme/theme@v1.0.0"),
            Some("1.0.0"),
        )];

        let updates = check_for_updates(&exts, &registry);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].mode, UpdateMode::Semver);
    }

    #[test]
    fn test_lookup_falls_back_to_case_insensitive() {
        let registry = registry_entry("Acme/Theme", Some("v2.0.0"), None);
        let exts = vec![installed("acme/theme", Some("acme/theme"), Some("1.0.0"))];
        assert_eq!(check_for_updates(&exts, &registry).len(), 1);
    }

    #[test]
    fn test_extensions_without_source_are_ignored() {
        let registry = registry_entry("acme/theme", Some("v2.0.0"), None);
        let exts = vec![installed("acme/theme", None, Some("1.0.0"))];
        assert!(check_for_updates(&exts, &registry).is_empty());
    }
}
