//! Editor snippet (`_snippets.json`) parsing
//!
//! A collection parse only fails when the whole document is unparsable or
//! the root is not an object. Individual malformed entries (empty prefix,
//! empty body, non-string array elements) are dropped silently so one bad
//! snippet never hides the rest of the collection.

use quartex_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// The single snippet filename candidate
pub const SNIPPET_FILE: &str = "_snippets.json";

/// One normalised snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Trigger prefixes, always at least one
    pub prefix: Vec<String>,

    /// Body lines, always at least one
    pub body: Vec<String>,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Map of snippet title to snippet
pub type SnippetCollection = BTreeMap<String, Snippet>;

/// Coerce a JSON value into a non-empty list of non-empty strings
///
/// Returns `None` when the value is malformed, which drops the entry.
fn string_list(value: &serde_json::Value) -> Option<Vec<String>> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(vec![s.clone()]),
        serde_json::Value::Array(items) if !items.is_empty() => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_json::Value::String(s) if !s.is_empty() => out.push(s.clone()),
                    _ => return None,
                }
            }
            Some(out)
        }
        _ => None,
    }
}

/// Parse snippet JSON content into a collection
///
/// The root must be a JSON object; anything else is a hard parse error.
pub fn parse_snippet_content(content: &str, origin: &Path) -> Result<SnippetCollection> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| Error::snippet(origin, e.to_string()))?;

    let serde_json::Value::Object(entries) = value else {
        return Err(Error::snippet(origin, "snippet document root must be an object"));
    };

    let mut collection = SnippetCollection::new();
    for (title, entry) in entries {
        let serde_json::Value::Object(fields) = entry else {
            debug!("Dropping malformed snippet entry '{}' (not an object)", title);
            continue;
        };

        let prefix = fields.get("prefix").and_then(string_list);
        let body = fields.get("body").and_then(string_list);
        let (Some(prefix), Some(body)) = (prefix, body) else {
            debug!("Dropping malformed snippet entry '{}'", title);
            continue;
        };

        let description = fields
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        collection.insert(
            title,
            Snippet {
                prefix,
                body,
                description,
            },
        );
    }

    Ok(collection)
}

/// Read and parse the snippet file inside a directory
pub fn parse_snippet_file(path: &Path) -> Result<SnippetCollection> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::snippet(path, e.to_string()))?;
    parse_snippet_content(&content, path)
}
