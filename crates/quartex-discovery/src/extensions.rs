//! Extension root discovery
//!
//! A staged tree carries its extensions under `_extensions/`. A manifest
//! directly inside a child directory makes that child an ownerless
//! extension; a manifest one level deeper makes the pair an `owner/name`
//! extension. Result order is not significant; callers de-duplicate by id
//! where needed.

use quartex_core::error::Result;
use quartex_core::manifest::{find_manifest, parse_manifest};
use quartex_core::types::{DiscoveredExtension, ExtensionId, InstalledExtension};
use std::path::Path;
use tracing::{debug, warn};

/// Directory extensions are installed into
pub const EXTENSIONS_DIR: &str = "_extensions";

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

fn child_dirs(dir: &Path) -> Vec<std::path::PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect()
}

/// Find every extension root inside a staged tree
///
/// Scans `<staged_dir>/_extensions/*` for ownerless extensions and
/// `<staged_dir>/_extensions/*/*` for `owner/name` layouts.
pub fn find_all_extension_roots(staged_dir: &Path) -> Result<Vec<DiscoveredExtension>> {
    let extensions_dir = staged_dir.join(EXTENSIONS_DIR);
    let mut found = Vec::new();

    if !extensions_dir.is_dir() {
        return Ok(found);
    }

    for child in child_dirs(&extensions_dir) {
        let Some(name) = dir_name(&child) else { continue };

        if find_manifest(&child).is_some() {
            found.push(DiscoveredExtension {
                id: ExtensionId::unowned(&name),
                relative_path: Path::new(EXTENSIONS_DIR).join(&name),
                extension_dir: child.clone(),
            });
            continue;
        }

        for grandchild in child_dirs(&child) {
            let Some(ext_name) = dir_name(&grandchild) else { continue };
            if find_manifest(&grandchild).is_some() {
                found.push(DiscoveredExtension {
                    id: ExtensionId::owned(&name, &ext_name),
                    relative_path: Path::new(EXTENSIONS_DIR).join(&name).join(&ext_name),
                    extension_dir: grandchild,
                });
            }
        }
    }

    debug!(
        "Discovered {} extension root(s) under {:?}",
        found.len(),
        staged_dir
    );
    Ok(found)
}

/// Scan a project for installed extensions
///
/// Returns a fresh record set on every call; identity is not stable across
/// scans. A malformed manifest excludes that one extension with a warning
/// instead of aborting the whole scan.
pub fn scan_project(project_dir: &Path) -> Result<Vec<InstalledExtension>> {
    let mut installed = Vec::new();

    for discovered in find_all_extension_roots(project_dir)? {
        let Some(manifest_path) = find_manifest(&discovered.extension_dir) else {
            continue;
        };
        match parse_manifest(&discovered.extension_dir) {
            Ok(manifest) => installed.push(InstalledExtension {
                id: discovered.id,
                directory: discovered.extension_dir,
                manifest_path,
                manifest,
            }),
            Err(e) => {
                warn!(
                    "Skipping extension {} with unreadable manifest: {}",
                    discovered.id, e
                );
            }
        }
    }

    Ok(installed)
}
