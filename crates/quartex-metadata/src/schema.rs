//! Extension schema parsing and normalisation
//!
//! Schemas arrive in one of two key styles: YAML documents use kebab-case
//! keys (`min-length`, `element-attributes`) while JSON documents are assumed
//! to already be canonical camelCase. YAML keys are normalised exactly once
//! at the parse boundary; nothing downstream ever sees a raw untyped map.

use quartex_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Schema filename candidates, in lookup precedence order
pub const SCHEMA_CANDIDATES: &[&str] = &["_schema.json", "_schema.yml", "_schema.yaml"];

/// The one `$schema` version URI this parser knows about
pub const KNOWN_SCHEMA_URI: &str = "https://schemas.quartex.dev/extension-schema/v1.json";

/// Top-level keys a schema document may carry, `$schema` excluded
const KNOWN_SECTIONS: &[&str] = &[
    "options",
    "shortcodes",
    "formats",
    "projects",
    "elementAttributes",
];

/// Normalised extension schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSchema {
    /// Declared schema version URI
    #[serde(default, rename = "$schema")]
    pub schema_uri: Option<String>,

    /// Document/format options contributed by the extension
    #[serde(default)]
    pub options: Option<BTreeMap<String, FieldDescriptor>>,

    /// Shortcode definitions
    #[serde(default)]
    pub shortcodes: Option<BTreeMap<String, ShortcodeSchema>>,

    /// Per-format option maps (format name -> option map)
    #[serde(default)]
    pub formats: Option<BTreeMap<String, BTreeMap<String, FieldDescriptor>>>,

    /// Project-level options
    #[serde(default)]
    pub projects: Option<BTreeMap<String, FieldDescriptor>>,

    /// Attribute maps keyed by group name (`_any` or a class name)
    #[serde(default)]
    pub element_attributes: Option<BTreeMap<String, BTreeMap<String, FieldDescriptor>>>,
}

/// Shortcode definition within a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcodeSchema {
    #[serde(default)]
    pub description: Option<String>,

    /// Positional or named arguments accepted by the shortcode
    #[serde(default)]
    pub arguments: BTreeMap<String, FieldDescriptor>,
}

/// Type name(s) a field accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    One(String),
    Many(Vec<String>),
}

/// Deprecation marker: a bare flag, a message, or structured detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deprecation {
    Flag(bool),
    Message(String),
    Detail {
        #[serde(default)]
        since: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default, rename = "replaceWith")]
        replace_with: Option<String>,
    },
}

/// Completion source: a literal value list or a file-path spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionSpec {
    Values(Vec<String>),
    FilePath {
        #[serde(rename = "filePath")]
        file_path: FilePathCompletion,
    },
}

/// File-path completion constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePathCompletion {
    /// Allowed file extensions (without the leading dot)
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Directory the paths are resolved against
    #[serde(default)]
    pub relative_to: Option<String>,
}

/// A single schema field descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Accepted type name(s)
    #[serde(default, rename = "type")]
    pub field_type: Option<TypeSpec>,

    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub description: Option<String>,

    /// Allowed literal values
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub min_length: Option<u64>,

    #[serde(default)]
    pub max_length: Option<u64>,

    #[serde(default)]
    pub min_items: Option<u64>,

    #[serde(default)]
    pub max_items: Option<u64>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default, rename = "const")]
    pub const_value: Option<serde_json::Value>,

    /// Alternative key spellings accepted for this field
    #[serde(default)]
    pub aliases: Option<Vec<String>>,

    #[serde(default)]
    pub deprecated: Option<Deprecation>,

    #[serde(default)]
    pub completion: Option<CompletionSpec>,

    /// Item descriptor for array types
    #[serde(default)]
    pub items: Option<Box<FieldDescriptor>>,

    /// Nested properties for object types
    #[serde(default)]
    pub properties: Option<BTreeMap<String, FieldDescriptor>>,
}

/// Kebab-case key aliases and their canonical camelCase spellings
///
/// Every kebab-case key the schema format accepts maps to exactly one
/// canonical field. User-chosen keys (option names, attribute names) are not
/// in this table and pass through untouched.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("element-attributes", "elementAttributes"),
    ("min-length", "minLength"),
    ("max-length", "maxLength"),
    ("min-items", "minItems"),
    ("max-items", "maxItems"),
    ("replace-with", "replaceWith"),
    ("file-path", "filePath"),
    ("relative-to", "relativeTo"),
];

fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(kebab, _)| *kebab == key)
        .map(|(_, camel)| *camel)
        .unwrap_or(key)
}

/// Recursively normalise aliased mapping keys to their canonical spelling
///
/// Values under `default`, `const`, and `enum` are user data and pass through
/// untouched.
fn normalize_keys(value: serde_yaml_ng::Value) -> serde_yaml_ng::Value {
    use serde_yaml_ng::Value;

    match value {
        Value::Mapping(mapping) => {
            let mut normalized = serde_yaml_ng::Mapping::with_capacity(mapping.len());
            for (key, val) in mapping {
                let (key, val) = match key {
                    Value::String(s) => {
                        let val = if s == "default" || s == "const" || s == "enum" {
                            val
                        } else {
                            normalize_keys(val)
                        };
                        (Value::String(canonical_key(&s).to_string()), val)
                    }
                    other => (other, normalize_keys(val)),
                };
                normalized.insert(key, val);
            }
            Value::Mapping(normalized)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Warn about top-level keys the parser does not recognise
///
/// `$schema` is excluded from this check and validated against the known
/// version URI instead; an unknown URI warns but never fails the parse.
fn check_top_level(value: &serde_yaml_ng::Value, path: &Path) {
    let Some(mapping) = value.as_mapping() else {
        return;
    };
    for key in mapping.keys() {
        let Some(key) = key.as_str() else { continue };
        if key == "$schema" {
            if let Some(uri) = mapping.get(key).and_then(|v| v.as_str()) {
                if uri != KNOWN_SCHEMA_URI {
                    warn!("Unrecognised $schema version '{}' in {:?}", uri, path);
                }
            }
        } else if !KNOWN_SECTIONS.contains(&key) {
            warn!("Unknown top-level schema key '{}' in {:?}", key, path);
        }
    }
}

/// Parse a schema file, normalising keys for YAML input
///
/// JSON input is assumed to already use canonical camelCase keys and is
/// deserialized as-is; YAML input goes through the kebab-case normalisation
/// pass first.
pub fn parse_schema_file(path: &Path) -> Result<ExtensionSchema> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::schema(path, e.to_string()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| Error::schema(path, e.to_string()))?;
        if let Some(uri) = value.get("$schema").and_then(|v| v.as_str()) {
            if uri != KNOWN_SCHEMA_URI {
                warn!("Unrecognised $schema version '{}' in {:?}", uri, path);
            }
        }
        serde_json::from_value(value).map_err(|e| Error::schema(path, e.to_string()))
    } else {
        let value: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(&content).map_err(|e| Error::schema(path, e.to_string()))?;
        let value = normalize_keys(value);
        check_top_level(&value, path);
        serde_yaml_ng::from_value(value).map_err(|e| Error::schema(path, e.to_string()))
    }
}

/// Find the schema file in a directory, honouring the precedence
/// `_schema.json` > `_schema.yml` > `_schema.yaml`
pub fn find_schema_file(dir: &Path) -> Option<std::path::PathBuf> {
    SCHEMA_CANDIDATES
        .iter()
        .map(|c| dir.join(c))
        .find(|p| p.is_file())
}
