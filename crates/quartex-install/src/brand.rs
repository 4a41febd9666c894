//! Brand "use" flow
//!
//! Copies a source's brand file to `<project>/_brand/_brand.yml` plus every
//! referenced asset at its brand-relative path. Each asset passes two
//! independent containment checks before copying: the target must stay
//! inside `_brand/` and the source must stay inside the brand file's own
//! directory. A path failing either check is skipped with a warning, never
//! copied, and never fails the operation. After copying, files under
//! `_brand/` that no longer belong to the brand can be cleaned up behind a
//! confirmation callback; individual deletes there are best-effort.

use crate::copy::find_conflicts;
use crate::policy::{ConflictPolicy, Resolution};
use crate::report::OperationReport;
use quartex_core::error::{Error, Result};
use quartex_core::types::registry::RegistrySnapshot;
use quartex_core::types::InstallSource;
use quartex_discovery::{extract_brand_file_paths, find_brand_file};
use quartex_staging::{stage_source, StageOptions};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use tracing::{debug, warn};

/// Directory brand files install into
pub const BRAND_DIR: &str = "_brand";

/// Canonical brand file name at the install target
pub const BRAND_TARGET_FILE: &str = "_brand.yml";

/// Asks whether the listed stale files should be deleted
pub type CleanupConfirm<'a> = &'a mut dyn FnMut(&[PathBuf]) -> bool;

/// Resolve `.` and `..` lexically, without touching the filesystem
///
/// Sources may not exist and targets usually don't yet, so containment has
/// to be decided on path shape alone.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `base.join(rel)` stays inside `base`
///
/// Component-wise containment over normalised paths, not a substring check.
/// An absolute `rel` never stays within.
fn stays_within(base: &Path, rel: &Path) -> bool {
    if rel.is_absolute() {
        return false;
    }
    lexical_normalize(&base.join(rel)).starts_with(lexical_normalize(base))
}

/// One file the brand install intends to write
struct BrandJob {
    source: PathBuf,
    /// Relative to the target `_brand/` directory
    target_rel: PathBuf,
}

/// Install a source's brand into a project
pub async fn use_brand(
    source: &InstallSource,
    project_dir: &Path,
    registry: Option<&RegistrySnapshot>,
    policy: &mut dyn ConflictPolicy,
    confirm_cleanup: Option<CleanupConfirm<'_>>,
    stage_opts: &StageOptions,
) -> Result<OperationReport> {
    let staged = stage_source(source, registry, stage_opts).await?;
    let result = run_brand_flow(&staged.staged_dir, project_dir, policy, confirm_cleanup);
    staged.cleanup();
    result
}

fn run_brand_flow(
    staged_dir: &Path,
    project_dir: &Path,
    policy: &mut dyn ConflictPolicy,
    confirm_cleanup: Option<CleanupConfirm<'_>>,
) -> Result<OperationReport> {
    let Some(brand) = find_brand_file(staged_dir) else {
        return Err(Error::extension_with_suggestion(
            "no brand file found in the source",
            "expected _brand.yml at the source root or a brand extension under _extensions",
        ));
    };

    let target_dir = project_dir.join(BRAND_DIR);
    let mut report = OperationReport::completed();

    let mut jobs = vec![BrandJob {
        source: brand.brand_file_path.clone(),
        target_rel: PathBuf::from(BRAND_TARGET_FILE),
    }];

    for asset in extract_brand_file_paths(&brand.brand_file_path) {
        let rel = PathBuf::from(&asset);

        // Both checks must pass: target inside _brand/, source inside the
        // brand file's directory
        if !stays_within(&target_dir, &rel) || !stays_within(&brand.brand_file_dir, &rel) {
            warn!("Brand asset {:?} escapes its allowed directory; skipping", asset);
            report.skipped.push(rel);
            continue;
        }

        let source_path = brand.brand_file_dir.join(&rel);
        if !source_path.is_file() {
            warn!("Brand asset {:?} not found in the source; skipping", asset);
            report.skipped.push(rel);
            continue;
        }

        jobs.push(BrandJob {
            source: source_path,
            target_rel: rel,
        });
    }

    let planned: Vec<PathBuf> = jobs.iter().map(|j| j.target_rel.clone()).collect();
    let conflicts = find_conflicts(&target_dir, &planned);
    let resolution = if conflicts.is_empty() {
        Resolution::All
    } else {
        policy.resolve(&conflicts)
    };
    if resolution == Resolution::Cancelled {
        return Ok(OperationReport::cancelled());
    }

    for job in &jobs {
        let target = target_dir.join(&job.target_rel);
        let exists = target.exists();

        if exists && !resolution.allows(&job.target_rel) {
            report.skipped.push(job.target_rel.clone());
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&job.source, &target)?;

        if exists {
            report.overwritten.push(job.target_rel.clone());
        } else {
            report.created.push(job.target_rel.clone());
        }
    }

    // Everything the brand currently claims, written or deliberately kept;
    // anything else under _brand/ is stale
    let managed: BTreeSet<String> = planned.iter().map(|p| forward_slashes(p)).collect();
    let stale = find_stale_files(&target_dir, &managed);

    if !stale.is_empty() {
        if let Some(confirm) = confirm_cleanup {
            if confirm(&stale) {
                report.cleaned = delete_stale_files(&target_dir, &stale);
                remove_empty_dirs(&target_dir);
            }
        }
    }

    Ok(report)
}

fn forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn find_stale_files(target_dir: &Path, managed: &BTreeSet<String>) -> Vec<PathBuf> {
    let mut stale = Vec::new();
    for entry in WalkDir::new(target_dir).follow_links(false) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(target_dir) else {
            continue;
        };
        if !managed.contains(&forward_slashes(rel)) {
            stale.push(rel.to_path_buf());
        }
    }
    stale.sort();
    stale
}

/// Delete each stale file, swallowing individual failures
fn delete_stale_files(target_dir: &Path, stale: &[PathBuf]) -> Vec<PathBuf> {
    let mut cleaned = Vec::new();
    for rel in stale {
        match fs::remove_file(target_dir.join(rel)) {
            Ok(()) => {
                debug!("Cleaned stale brand file {:?}", rel);
                cleaned.push(rel.clone());
            }
            Err(e) => warn!("Failed to clean stale brand file {:?}: {}", rel, e),
        }
    }
    cleaned
}

/// Remove directories left empty by cleanup, bottom-up
///
/// Returns whether `dir` itself ended up empty. Removal failures are
/// swallowed like the file deletes.
fn remove_empty_dirs(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    let mut empty = true;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && remove_empty_dirs(&path) {
            if fs::remove_dir(&path).is_err() {
                empty = false;
            }
        } else {
            empty = false;
        }
    }
    empty
}
