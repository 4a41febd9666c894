//! Candidate file planning
//!
//! Turns a staged source tree into the ordered, relative file list a copy
//! step will act on. Template copies exclude repository cruft plus
//! `_extensions/**` (extensions install through their own path); extension
//! copies exclude the cruft set only.

use globset::{Glob, GlobSet, GlobSetBuilder};
use quartex_core::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Repository cruft never worth copying into a project
pub const CRUFT_EXCLUDES: &[&str] = &[
    ".git",
    ".git/**",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".github/**",
    ".hg/**",
    ".svn/**",
    "**/.DS_Store",
    "**/Thumbs.db",
    "**/desktop.ini",
    "node_modules/**",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "renv.lock",
    "dist/**",
    "build/**",
    "target/**",
    ".idea/**",
    ".vscode/**",
    ".quarto/**",
    "_site/**",
];

/// Extra excludes for template copies on top of [`CRUFT_EXCLUDES`]
pub const TEMPLATE_EXCLUDES: &[&str] = &["_extensions", "_extensions/**"];

fn build_globset<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::extension(format!("invalid glob pattern {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::extension(format!("failed to build glob set: {e}")))
}

/// Relative path with forward slashes, for stable glob matching
fn relative_to(base: &Path, path: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|rel| {
        let joined = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        PathBuf::from(joined)
    })
}

fn walk_files(
    base: &Path,
    excludes: &GlobSet,
    includes: Option<&GlobSet>,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry.map_err(|e| Error::extension(format!("walk failed: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative_to(base, entry.path()) else {
            continue;
        };
        if excludes.is_match(&rel) {
            continue;
        }
        if let Some(includes) = includes {
            if !includes.is_match(&rel) {
                continue;
            }
        }
        files.push(rel);
    }

    files.sort();
    Ok(files)
}

/// List the files a template copy would take from a staged tree
///
/// Relative paths, sorted, after the default excludes union
/// `extra_excludes`, optionally narrowed by `includes`.
pub fn list_template_files(
    staged_dir: &Path,
    extra_excludes: &[String],
    includes: &[String],
) -> Result<Vec<PathBuf>> {
    let patterns = CRUFT_EXCLUDES
        .iter()
        .chain(TEMPLATE_EXCLUDES.iter())
        .copied()
        .chain(extra_excludes.iter().map(String::as_str));
    let excludes = build_globset(patterns)?;

    let includes = if includes.is_empty() {
        None
    } else {
        Some(build_globset(includes.iter().map(String::as_str))?)
    };

    walk_files(staged_dir, &excludes, includes.as_ref())
}

/// List the files an extension copy takes from one extension root
///
/// Only the cruft excludes apply here; the extension's own tree is copied
/// whole.
pub fn list_extension_files(extension_dir: &Path) -> Result<Vec<PathBuf>> {
    let excludes = build_globset(CRUFT_EXCLUDES.iter().copied())?;
    walk_files(extension_dir, &excludes, None)
}
