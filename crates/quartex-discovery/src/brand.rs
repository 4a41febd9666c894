//! Brand file detection and asset path extraction
//!
//! A brand is a `_brand.yml` document plus the logo and font assets it
//! references. Brands arrive either as a root-level file or declared by an
//! extension via `contributes.metadata.project.brand`. Detection is always
//! best-effort: unreadable or unparsable candidates are skipped, never
//! surfaced as errors.

use quartex_core::manifest::parse_manifest;
use serde_yaml_ng::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::extensions::EXTENSIONS_DIR;

/// Root brand filename candidates, in preference order
pub const BRAND_CANDIDATES: &[&str] = &["_brand.yml", "_brand.yaml"];

/// File extensions that classify a separator-free string as a local asset
/// path rather than a named reference
///
/// Known trade-off: a named reference that happens to end in one of these
/// (say a theme called `dark.yml`) is misclassified as a path. Real brand
/// files use short identifiers for named references, so this is accepted.
const ASSET_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "bmp", "tif", "tiff",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // styles
    "css", "scss", "sass",
    // data
    "json", "yml", "yaml", "csv",
];

/// Result of probing one extension directory for a brand declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandExtensionInfo {
    /// Whether the extension declares a brand file
    pub is_brand_extension: bool,

    /// The declared brand filename, relative to the extension directory
    pub brand_file: Option<String>,
}

impl BrandExtensionInfo {
    fn none() -> Self {
        Self {
            is_brand_extension: false,
            brand_file: None,
        }
    }
}

/// A located brand file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandFileInfo {
    /// Absolute path of the brand document
    pub brand_file_path: PathBuf,

    /// Directory the brand document lives in; asset paths resolve against it
    pub brand_file_dir: PathBuf,

    /// Whether the brand came from an extension declaration rather than a
    /// root-level `_brand.yml`
    pub is_brand_extension: bool,
}

/// Check whether an extension directory declares a brand file
///
/// Reads the manifest candidates in preference order and looks for
/// `contributes.metadata.project.brand`. Any read or parse failure yields a
/// negative result rather than an error.
pub fn check_for_brand_extension(extension_dir: &Path) -> BrandExtensionInfo {
    match parse_manifest(extension_dir) {
        Ok(manifest) => match manifest.declared_brand() {
            Some(brand_file) => BrandExtensionInfo {
                is_brand_extension: true,
                brand_file: Some(brand_file),
            },
            None => BrandExtensionInfo::none(),
        },
        Err(_) => BrandExtensionInfo::none(),
    }
}

fn child_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect()
}

fn brand_from_extension_dir(dir: &Path) -> Option<BrandFileInfo> {
    let info = check_for_brand_extension(dir);
    let brand_file = info.brand_file?;
    let brand_file_path = dir.join(&brand_file);
    if !brand_file_path.is_file() {
        debug!(
            "Extension at {:?} declares missing brand file {}",
            dir, brand_file
        );
        return None;
    }
    Some(BrandFileInfo {
        brand_file_dir: dir.to_path_buf(),
        brand_file_path,
        is_brand_extension: true,
    })
}

/// Find the brand file in a staged tree, if any
///
/// Search order, first match wins:
/// 1. root-level `_brand.yml`/`_brand.yaml`
/// 2. `_extensions/*` direct children declaring a brand
/// 3. `_extensions/*/*` nested extensions declaring a brand
pub fn find_brand_file(staged_dir: &Path) -> Option<BrandFileInfo> {
    for candidate in BRAND_CANDIDATES {
        let path = staged_dir.join(candidate);
        if path.is_file() {
            return Some(BrandFileInfo {
                brand_file_dir: staged_dir.to_path_buf(),
                brand_file_path: path,
                is_brand_extension: false,
            });
        }
    }

    let extensions_dir = staged_dir.join(EXTENSIONS_DIR);
    if !extensions_dir.is_dir() {
        return None;
    }

    let children = child_dirs(&extensions_dir);
    for child in &children {
        if let Some(info) = brand_from_extension_dir(child) {
            return Some(info);
        }
    }
    for child in &children {
        for grandchild in child_dirs(child) {
            if let Some(info) = brand_from_extension_dir(&grandchild) {
                return Some(info);
            }
        }
    }

    None
}

/// Whether a referenced value is a local file path rather than a named
/// reference or URL
fn is_local_file_path(value: &str) -> bool {
    if value.is_empty() || value.starts_with("http://") || value.starts_with("https://") {
        return false;
    }
    if value.contains('/') || value.contains('\\') {
        return true;
    }
    value
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn push_if_local(value: &Value, out: &mut Vec<String>, seen: &mut BTreeSet<String>) {
    if let Some(s) = value.as_str() {
        if is_local_file_path(s) && seen.insert(s.to_string()) {
            out.push(s.to_string());
        }
    }
}

/// A logo slot value is a plain string or a `{light, dark}` pair; image map
/// entries may also wrap the path in a `{path: ...}` mapping
fn collect_logo_value(value: &Value, out: &mut Vec<String>, seen: &mut BTreeSet<String>) {
    match value {
        Value::String(_) => push_if_local(value, out, seen),
        Value::Mapping(mapping) => {
            for key in ["light", "dark", "path"] {
                if let Some(inner) = mapping.get(key) {
                    push_if_local(inner, out, seen);
                }
            }
        }
        _ => {}
    }
}

/// Extract every local-file reference from a brand document
///
/// Sources considered: `logo.images.*`, `logo.{small,medium,large}`, and
/// `typography.fonts[].files` for entries with `source: "file"`. Output is
/// de-duplicated; URLs are never treated as local paths.
pub fn extract_brand_file_paths(brand_yaml_path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(brand_yaml_path) else {
        return Vec::new();
    };
    let Ok(doc) = serde_yaml_ng::from_str::<Value>(&content) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen = BTreeSet::new();

    if let Some(logo) = doc.get("logo") {
        if let Some(images) = logo.get("images").and_then(Value::as_mapping) {
            for (_, image) in images {
                collect_logo_value(image, &mut out, &mut seen);
            }
        }
        for slot in ["small", "medium", "large"] {
            if let Some(value) = logo.get(slot) {
                collect_logo_value(value, &mut out, &mut seen);
            }
        }
    }

    if let Some(fonts) = doc
        .get("typography")
        .and_then(|t| t.get("fonts"))
        .and_then(Value::as_sequence)
    {
        for font in fonts {
            let is_file_source = font
                .get("source")
                .and_then(Value::as_str)
                .is_some_and(|s| s == "file");
            if !is_file_source {
                continue;
            }
            if let Some(files) = font.get("files").and_then(Value::as_sequence) {
                for file in files {
                    push_if_local(file, &mut out, &mut seen);
                }
            }
        }
    }

    out
}
