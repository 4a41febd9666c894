//! Staged-source resolution
//!
//! `stage_source` turns an `InstallSource` into a directory on disk ready
//! for discovery and copying. Remote sources download and extract into a
//! fresh, uniquely named scratch directory; local directories are used in
//! place. The stager never cleans up after itself on success: later pipeline
//! stages still read from the staged tree, so the caller owns the
//! `cleanup_extraction` call.

use quartex_core::error::{Error, Result};
use quartex_core::types::registry::{lookup_entry, RegistrySnapshot};
use quartex_core::types::{InstallSource, VersionSpec};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::download::ArchiveDownloader;
use crate::extract::extract_archive;

/// Options for a staging call
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    /// Network timeout for downloads; `None` uses the downloader default
    pub timeout: Option<Duration>,
}

/// A resolved staged source
#[derive(Debug, Clone)]
pub struct StagedSource {
    /// Scratch extraction directory, `None` for local directory sources.
    /// The caller must pass this to `cleanup_extraction` when done.
    pub extract_dir: Option<PathBuf>,

    /// Root directory for discovery and copying, after the single-root
    /// heuristic
    pub staged_dir: PathBuf,

    /// Whether the source was a local directory used in place
    pub is_local: bool,
}

/// Resolve the git ref to download for a GitHub source
///
/// The registry lookup is best-effort: it picks the latest release tag (or
/// the default branch) for unpinned sources, and any failure falls back to
/// letting the download step resolve `HEAD` itself. A lookup failure is
/// never fatal here.
fn resolve_github_ref(
    owner: &str,
    repo: &str,
    version: Option<&VersionSpec>,
    registry: Option<&RegistrySnapshot>,
) -> String {
    if let Some(spec) = version {
        if let Some(r) = spec.as_ref_str() {
            return r.to_string();
        }
    }

    // Unpinned or explicitly "latest": consult the registry snapshot
    if let Some(snapshot) = registry {
        let key = format!("{owner}/{repo}");
        match lookup_entry(snapshot, &key) {
            Some(entry) => {
                if let Some(tag) = &entry.latest_tag {
                    debug!("Resolved {} to latest release tag {}", key, tag);
                    return tag.clone();
                }
                if let Some(branch) = &entry.default_branch_ref {
                    debug!("Resolved {} to default branch {}", key, branch);
                    return branch.clone();
                }
            }
            None => warn!("No registry entry for {}, deferring ref resolution", key),
        }
    }

    // Codeload resolves HEAD to the default branch
    "HEAD".to_string()
}

/// Create the fresh scratch directory for one staging call
///
/// Every call allocates a uniquely named directory; no two staging calls
/// ever share scratch space.
fn create_scratch_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("quartex-stage-")
        .tempdir()?;
    Ok(dir.keep())
}

/// Whether `child`, fully resolved, stays inside the resolved `root`
///
/// Containment is component-wise over canonicalised paths, not a substring
/// check.
fn resolves_inside(root: &Path, child: &Path) -> bool {
    let Ok(root) = std::fs::canonicalize(root) else {
        return false;
    };
    match std::fs::canonicalize(child) {
        Ok(resolved) => resolved.starts_with(&root),
        // Broken symlink: treat as not contained
        Err(_) => false,
    }
}

/// Apply the single-root directory heuristic
///
/// GitHub archives wrap their content in one `repo-ref/` directory. If the
/// extraction directory contains exactly one entry and that entry is a
/// directory, the inner directory is the staged root; otherwise the
/// extraction directory itself is. A symlink only counts as a directory when
/// its target resolves inside the extraction root; an escaping or broken
/// symlink is treated as a plain file so it can never redirect staging
/// outside the scratch area.
pub fn resolve_staged_dir(extract_dir: &Path) -> Result<PathBuf> {
    let entries: Vec<_> = std::fs::read_dir(extract_dir)?
        .collect::<std::io::Result<Vec<_>>>()?;

    if entries.len() != 1 {
        return Ok(extract_dir.to_path_buf());
    }

    let entry = &entries[0];
    let path = entry.path();
    let file_type = entry.file_type()?;

    if file_type.is_dir() {
        return Ok(path);
    }

    if file_type.is_symlink() {
        if resolves_inside(extract_dir, &path) && path.is_dir() {
            return Ok(path);
        }
        debug!(
            "Single entry {:?} is a symlink escaping the extraction root; ignoring",
            path
        );
    }

    Ok(extract_dir.to_path_buf())
}

/// Stage an install source into a readable directory
///
/// Exactly one scratch extraction directory is created per call for
/// non-local sources. A failed download or extraction removes it before the
/// error propagates; on success, cleanup is the caller's responsibility via
/// `cleanup_extraction(extract_dir)`, normally in the operation's final
/// cleanup path.
pub async fn stage_source(
    source: &InstallSource,
    registry: Option<&RegistrySnapshot>,
    options: &StageOptions,
) -> Result<StagedSource> {
    match source {
        InstallSource::Local { path } => stage_local(path),
        InstallSource::Github {
            owner,
            repo,
            version,
        } => {
            let git_ref = resolve_github_ref(owner, repo, version.as_ref(), registry);
            let downloader = make_downloader(options)?;
            let extract_dir = create_scratch_dir()?;
            let archive = match downloader
                .download_github_archive(owner, repo, &git_ref, &extract_dir)
                .await
            {
                Ok(archive) => archive,
                Err(e) => {
                    cleanup_extraction(&extract_dir);
                    return Err(e);
                }
            };
            finish_remote_stage(extract_dir, &archive)
        }
        InstallSource::Url { url } => {
            let downloader = make_downloader(options)?;
            let extract_dir = create_scratch_dir()?;
            let archive = match downloader.download_url(url, &extract_dir).await {
                Ok(archive) => archive,
                Err(e) => {
                    cleanup_extraction(&extract_dir);
                    return Err(e);
                }
            };
            finish_remote_stage(extract_dir, &archive)
        }
    }
}

fn make_downloader(options: &StageOptions) -> Result<ArchiveDownloader> {
    match options.timeout {
        Some(timeout) => ArchiveDownloader::with_timeout(timeout),
        None => ArchiveDownloader::new(),
    }
}

fn stage_local(path: &Path) -> Result<StagedSource> {
    if path.is_dir() {
        debug!("Using local directory in place: {:?}", path);
        return Ok(StagedSource {
            extract_dir: None,
            staged_dir: path.to_path_buf(),
            is_local: true,
        });
    }

    if path.is_file() {
        // A local archive file extracts like a remote one
        let extract_dir = create_scratch_dir()?;
        let content_dir = extract_dir.join("content");
        if let Err(e) = extract_archive(path, &content_dir) {
            cleanup_extraction(&extract_dir);
            return Err(e);
        }
        let staged_dir = resolve_staged_dir(&content_dir)?;
        return Ok(StagedSource {
            extract_dir: Some(extract_dir),
            staged_dir,
            is_local: false,
        });
    }

    Err(Error::extension_with_suggestion(
        format!("local path does not exist: {}", path.display()),
        "check the path, or use owner/repo for a GitHub source",
    ))
}

/// Extract a downloaded archive and resolve the staged root
fn finish_remote_stage(extract_dir: PathBuf, archive: &Path) -> Result<StagedSource> {
    let content_dir = extract_dir.join("content");
    if let Err(e) = extract_archive(archive, &content_dir) {
        cleanup_extraction(&extract_dir);
        return Err(e);
    }

    let staged_dir = match resolve_staged_dir(&content_dir) {
        Ok(dir) => dir,
        Err(e) => {
            cleanup_extraction(&extract_dir);
            return Err(e);
        }
    };
    Ok(StagedSource {
        extract_dir: Some(extract_dir),
        staged_dir,
        is_local: false,
    })
}

/// Remove a scratch extraction directory
///
/// Best-effort: a failed removal is logged, never propagated, since cleanup
/// runs on both success and failure paths.
pub fn cleanup_extraction(extract_dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(extract_dir) {
        if extract_dir.exists() {
            warn!("Failed to clean up extraction dir {:?}: {}", extract_dir, e);
        }
    } else {
        debug!("Cleaned up extraction dir {:?}", extract_dir);
    }
}

impl StagedSource {
    /// Run the caller-owned cleanup, if any scratch space exists
    pub fn cleanup(&self) {
        if let Some(extract_dir) = &self.extract_dir {
            cleanup_extraction(extract_dir);
        }
    }
}
