//! Extension install operation
//!
//! Stages a source, discovers every extension root in the staged tree, and
//! copies each into `<project>/_extensions/<owner>/<name>` (or
//! `<project>/_extensions/<name>` when ownerless). Finding no extension at
//! all is fatal with a remediation hint; so is a vanished staged root, which
//! signals an internal invariant violation rather than anything the user can
//! fix.

use crate::copy::{copy_files, CopyStep};
use crate::plan::list_extension_files;
use crate::policy::ConflictPolicy;
use crate::report::OperationReport;
use quartex_core::error::{Error, Result};
use quartex_core::manifest::{find_manifest, parse_manifest};
use quartex_core::types::registry::RegistrySnapshot;
use quartex_core::types::{DiscoveredExtension, InstallSource, InstalledExtension};
use quartex_discovery::find_all_extension_roots;
use quartex_staging::{stage_source, StageOptions};
use std::path::Path;
use tracing::{debug, info};

/// Result of an install operation
#[derive(Debug)]
pub struct InstallOutcome {
    pub report: OperationReport,
    /// Extensions now present in the project, parsed from their installed
    /// manifests. Empty when the operation was cancelled.
    pub installed: Vec<InstalledExtension>,
}

/// Install every extension found in a source into a project
pub async fn install_extensions(
    source: &InstallSource,
    project_dir: &Path,
    registry: Option<&RegistrySnapshot>,
    policy: &mut dyn ConflictPolicy,
    stage_opts: &StageOptions,
) -> Result<InstallOutcome> {
    let staged = stage_source(source, registry, stage_opts).await?;
    let result = install_from_staged(&staged.staged_dir, project_dir, policy);
    staged.cleanup();
    result
}

/// Install phase against an already-staged tree
///
/// Split out so the two-phase select flow can replay its staged tree here
/// without re-downloading.
pub(crate) fn install_from_staged(
    staged_dir: &Path,
    project_dir: &Path,
    policy: &mut dyn ConflictPolicy,
) -> Result<InstallOutcome> {
    if !staged_dir.is_dir() {
        return Err(Error::extension(format!(
            "staged source root is missing: {}",
            staged_dir.display()
        )));
    }

    let roots = find_all_extension_roots(staged_dir)?;
    if roots.is_empty() {
        return Err(Error::extension_with_suggestion(
            "no extensions found in the source",
            "check that the source contains an _extensions directory with an _extension.yml manifest",
        ));
    }

    let mut report = OperationReport::completed();
    let mut installed = Vec::new();

    for root in roots {
        match install_one(&root, project_dir, policy)? {
            Some((one, extension)) => {
                report.absorb(one);
                installed.push(extension);
            }
            None => {
                return Ok(InstallOutcome {
                    report: OperationReport::cancelled(),
                    installed: Vec::new(),
                });
            }
        }
    }

    info!(
        "Installed {} extension(s) into {}",
        installed.len(),
        project_dir.display()
    );
    Ok(InstallOutcome { report, installed })
}

pub(crate) fn install_one(
    root: &DiscoveredExtension,
    project_dir: &Path,
    policy: &mut dyn ConflictPolicy,
) -> Result<Option<(OperationReport, InstalledExtension)>> {
    let target_dir = project_dir.join(&root.relative_path);
    let files = list_extension_files(&root.extension_dir)?;
    debug!(
        "Copying {} file(s) for extension {} into {:?}",
        files.len(),
        root.id,
        target_dir
    );

    let outcome = match copy_files(&root.extension_dir, &target_dir, &files, policy)? {
        CopyStep::Done(outcome) => outcome,
        CopyStep::Cancelled => return Ok(None),
    };

    // The copy claimed success, so a manifest must exist at the target
    let Some(manifest_path) = find_manifest(&target_dir) else {
        return Err(Error::extension(format!(
            "extension {} has no manifest after install; the target may have been modified concurrently",
            root.id
        )));
    };
    let manifest = parse_manifest(&target_dir)?;

    let mut report = OperationReport::completed();
    let prefix = &root.relative_path;
    report.created = outcome.created.iter().map(|f| prefix.join(f)).collect();
    report.overwritten = outcome.overwritten.iter().map(|f| prefix.join(f)).collect();
    report.skipped = outcome.skipped.iter().map(|f| prefix.join(f)).collect();

    Ok(Some((
        report,
        InstalledExtension {
            id: root.id.clone(),
            directory: target_dir,
            manifest_path,
            manifest,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{OverwriteAll, SkipAll};
    use quartex_core::types::ExtensionId;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn seed_extension(root: &Path, rel: &str, version: &str) {
        let dir = root.join("_extensions").join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("_extension.yml"),
            format!("title: Demo\nversion: {version}\ncontributes:\n  shortcodes:\n    - demo.lua\n"),
        )
        .unwrap();
        fs::write(dir.join("demo.lua"), "-- demo").unwrap();
    }

    #[tokio::test]
    async fn test_install_from_local_source() {
        let source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        seed_extension(source.path(), "acme/demo", "1.0.0");

        let outcome = install_extensions(
            &InstallSource::Local {
                path: source.path().to_path_buf(),
            },
            project.path(),
            None,
            &mut SkipAll,
            &StageOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.installed.len(), 1);
        assert_eq!(outcome.installed[0].id, ExtensionId::owned("acme", "demo"));
        assert_eq!(outcome.report.created.len(), 2);
        assert!(project
            .path()
            .join("_extensions/acme/demo/_extension.yml")
            .exists());
        assert!(project.path().join("_extensions/acme/demo/demo.lua").exists());
    }

    #[tokio::test]
    async fn test_install_without_extensions_is_fatal_with_hint() {
        let source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(source.path().join("readme.md"), "nothing here").unwrap();

        let err = install_extensions(
            &InstallSource::Local {
                path: source.path().to_path_buf(),
            },
            project.path(),
            None,
            &mut SkipAll,
            &StageOptions::default(),
        )
        .await
        .unwrap_err();

        let Error::Extension { suggestion, .. } = err else {
            panic!("expected extension error");
        };
        assert!(suggestion.is_some());
    }

    #[tokio::test]
    async fn test_reinstall_with_force_overwrites() {
        let source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        seed_extension(source.path(), "demo", "2.0.0");
        seed_extension(project.path(), "demo", "1.0.0");

        let outcome = install_extensions(
            &InstallSource::Local {
                path: source.path().to_path_buf(),
            },
            project.path(),
            None,
            &mut OverwriteAll,
            &StageOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.overwritten.len(), 2);
        assert_eq!(
            outcome.installed[0].manifest.version.as_deref(),
            Some("2.0.0")
        );
        assert!(outcome
            .report
            .overwritten
            .contains(&PathBuf::from("_extensions/demo/_extension.yml")));
    }

    #[tokio::test]
    async fn test_reinstall_without_force_keeps_existing() {
        let source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        seed_extension(source.path(), "demo", "2.0.0");
        seed_extension(project.path(), "demo", "1.0.0");

        let outcome = install_extensions(
            &InstallSource::Local {
                path: source.path().to_path_buf(),
            },
            project.path(),
            None,
            &mut SkipAll,
            &StageOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.skipped.len(), 2);
        assert_eq!(
            outcome.installed[0].manifest.version.as_deref(),
            Some("1.0.0")
        );
    }
}
