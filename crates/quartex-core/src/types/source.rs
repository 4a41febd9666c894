//! Install source parsing and formatting
//!
//! An install source is a user-supplied string resolved once into a typed
//! `InstallSource` and passed immutably through the staging pipeline:
//! - GitHub: `owner/repo` with an optional `@version` suffix
//! - URL: anything starting with `http://` or `https://`
//! - Local: a filesystem path (or anything without a `/`)
//!
//! The parser here is deliberately lenient: ambiguous input (for example a
//! path with more than one slash) falls through to a local path. Callers that
//! need strict validation of an `owner/name` identifier use
//! `parse_extension_id` instead.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Version specifier on a GitHub install source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum VersionSpec {
    /// Latest release (or default branch when no release exists)
    Latest,
    /// A release/git tag such as `v1.0.0`
    Tag(String),
    /// A branch name
    Branch(String),
    /// A short (7) or full (40) commit hash
    Commit(String),
}

impl VersionSpec {
    /// The ref string sent to GitHub when resolving this spec
    pub fn as_ref_str(&self) -> Option<&str> {
        match self {
            VersionSpec::Latest => None,
            VersionSpec::Tag(s) | VersionSpec::Branch(s) | VersionSpec::Commit(s) => Some(s),
        }
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Tag(s) | VersionSpec::Branch(s) | VersionSpec::Commit(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

/// A resolved install source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum InstallSource {
    /// A GitHub repository, optionally pinned to a version
    Github {
        owner: String,
        repo: String,
        version: Option<VersionSpec>,
    },
    /// A direct archive URL
    Url { url: String },
    /// A local directory or archive file
    Local { path: PathBuf },
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v?\d+(\.\d+)*").expect("valid tag pattern"))
}

fn commit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([a-f0-9]{7}|[a-f0-9]{40})$").expect("valid commit pattern")
    })
}

/// Parse a version string into a `VersionSpec`
///
/// Resolution order:
/// 1. `latest` or empty string -> `Latest`
/// 2. `v?<digits>...` or any string starting with `v` -> `Tag`
///    (a tag always wins over a commit-shaped string: `v1a2b3c` is a tag)
/// 3. 7 or 40 character case-insensitive hex string -> `Commit`
/// 4. anything else -> `Branch`
pub fn parse_version_spec(raw: &str) -> VersionSpec {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("latest") {
        return VersionSpec::Latest;
    }
    if tag_pattern().is_match(raw) || raw.starts_with('v') {
        return VersionSpec::Tag(raw.to_string());
    }
    if commit_pattern().is_match(raw) {
        return VersionSpec::Commit(raw.to_lowercase());
    }
    VersionSpec::Branch(raw.to_string())
}

/// Returns true when the string looks like a local filesystem path
fn looks_like_path(raw: &str) -> bool {
    if raw.starts_with('.') || raw.starts_with('/') || raw.starts_with('~') {
        return true;
    }
    if raw.contains('\\') {
        return true;
    }
    // Windows drive letter, e.g. C:\ or C:/
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Parse a raw install string into an `InstallSource`
///
/// Rules, in order:
/// 1. `http://`/`https://` prefix -> `Url`
/// 2. no `/` at all, or a string that looks like a filesystem path -> `Local`
/// 3. otherwise split on the *last* `@` for an optional version suffix, then
///    split the remainder on `/`. A leading `@` belongs to the owner, not the
///    version separator, so scoped-style names parse correctly.
///
/// Input with more than one `/` is tolerated here and treated as a local
/// path; `parse_extension_id` is the strict variant that rejects it.
pub fn parse_install_source(raw: &str) -> InstallSource {
    let raw = raw.trim();

    if raw.starts_with("http://") || raw.starts_with("https://") {
        return InstallSource::Url {
            url: raw.to_string(),
        };
    }

    if !raw.contains('/') || looks_like_path(raw) {
        return InstallSource::Local {
            path: PathBuf::from(raw),
        };
    }

    // Split on the last '@'; an '@' at position 0 is part of the name
    let (repo_part, version_part) = match raw.rfind('@') {
        Some(idx) if idx > 0 => (&raw[..idx], Some(&raw[idx + 1..])),
        _ => (raw, None),
    };

    let segments: Vec<&str> = repo_part.split('/').collect();
    if segments.len() == 2 && !segments[0].is_empty() && !segments[1].is_empty() {
        return InstallSource::Github {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            version: version_part.map(parse_version_spec),
        };
    }

    // More than one slash (or an empty segment): defer to a local path
    InstallSource::Local {
        path: PathBuf::from(raw),
    }
}

/// Format an install source back to a stable, human-readable string
///
/// This is the left inverse of `parse_install_source`: re-parsing the output
/// yields a structurally equal source. The result is suitable for manifest
/// `source:` fields and error messages.
pub fn format_install_source(source: &InstallSource) -> String {
    match source {
        InstallSource::Github {
            owner,
            repo,
            version,
        } => match version {
            Some(v) => format!("{}/{}@{}", owner, repo, v),
            None => format!("{}/{}", owner, repo),
        },
        InstallSource::Url { url } => url.clone(),
        InstallSource::Local { path } => path.display().to_string(),
    }
}

impl std::fmt::Display for InstallSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_install_source(self))
    }
}
