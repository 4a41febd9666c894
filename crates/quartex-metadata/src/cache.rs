//! Per-directory metadata caches
//!
//! Each cache key (an absolute directory path) moves through a small state
//! machine: Unknown -> Loaded | Errored | KnownAbsent. Errors and known
//! absences are cached alongside values so repeated lookups against a broken
//! or empty directory never re-stat the filesystem until the key is
//! explicitly invalidated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::schema::{find_schema_file, parse_schema_file, ExtensionSchema};
use crate::snippets::{parse_snippet_file, SnippetCollection, SNIPPET_FILE};

/// Result of a loader attempt for one directory
pub enum LoadOutcome<T> {
    /// A candidate file was found and parsed
    Found(T),
    /// No candidate file exists in the directory
    Absent,
    /// A candidate file exists but could not be read or parsed
    Failed(String),
}

/// Finds and parses the metadata file for one directory
pub trait MetadataLoader {
    type Value;

    fn load(&self, dir: &Path) -> LoadOutcome<Self::Value>;
}

enum CacheState<T> {
    Loaded(T),
    Errored(String),
    KnownAbsent,
}

/// Cache of parsed metadata keyed by absolute directory path
///
/// Safe under the sequential single-threaded access model; no internal
/// synchronisation.
pub struct DirectoryCache<L: MetadataLoader> {
    loader: L,
    entries: HashMap<PathBuf, CacheState<L::Value>>,
}

impl<L: MetadataLoader> DirectoryCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    /// Get the cached value for a directory, loading it on first access
    ///
    /// Returns `None` for both the Errored and KnownAbsent states; use
    /// `get_error` to distinguish them.
    pub fn get(&mut self, dir: &Path) -> Option<&L::Value> {
        if !self.entries.contains_key(dir) {
            let state = match self.loader.load(dir) {
                LoadOutcome::Found(value) => CacheState::Loaded(value),
                LoadOutcome::Absent => CacheState::KnownAbsent,
                LoadOutcome::Failed(message) => {
                    debug!("Caching load error for {:?}: {}", dir, message);
                    CacheState::Errored(message)
                }
            };
            self.entries.insert(dir.to_path_buf(), state);
        }

        match self.entries.get(dir) {
            Some(CacheState::Loaded(value)) => Some(value),
            _ => None,
        }
    }

    /// Get the cached error message for a directory, if its last load failed
    pub fn get_error(&self, dir: &Path) -> Option<&str> {
        match self.entries.get(dir) {
            Some(CacheState::Errored(message)) => Some(message),
            _ => None,
        }
    }

    /// Whether the key holds a value or an error
    ///
    /// A KnownAbsent key reports `false` even though it is cached: "has"
    /// means "has a value or error", not "has been queried".
    pub fn has(&self, dir: &Path) -> bool {
        matches!(
            self.entries.get(dir),
            Some(CacheState::Loaded(_) | CacheState::Errored(_))
        )
    }

    /// Reset one key to Unknown; the next `get` re-reads from disk
    pub fn invalidate(&mut self, dir: &Path) {
        self.entries.remove(dir);
    }

    /// Reset every key to Unknown
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }
}

/// Loader for `_schema.json`/`.yml`/`.yaml`
pub struct SchemaLoader;

impl MetadataLoader for SchemaLoader {
    type Value = ExtensionSchema;

    fn load(&self, dir: &Path) -> LoadOutcome<ExtensionSchema> {
        let Some(path) = find_schema_file(dir) else {
            return LoadOutcome::Absent;
        };
        match parse_schema_file(&path) {
            Ok(schema) => LoadOutcome::Found(schema),
            Err(e) => LoadOutcome::Failed(e.to_string()),
        }
    }
}

/// Loader for `_snippets.json`
pub struct SnippetLoader;

impl MetadataLoader for SnippetLoader {
    type Value = SnippetCollection;

    fn load(&self, dir: &Path) -> LoadOutcome<SnippetCollection> {
        let path = dir.join(SNIPPET_FILE);
        if !path.is_file() {
            return LoadOutcome::Absent;
        }
        match parse_snippet_file(&path) {
            Ok(collection) => LoadOutcome::Found(collection),
            Err(e) => LoadOutcome::Failed(e.to_string()),
        }
    }
}

/// Schema cache keyed by extension directory
pub type SchemaCache = DirectoryCache<SchemaLoader>;

/// Snippet cache keyed by extension directory
pub type SnippetCache = DirectoryCache<SnippetLoader>;

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(SchemaLoader)
    }
}

impl Default for SnippetCache {
    fn default() -> Self {
        Self::new(SnippetLoader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_absent_is_cached_until_invalidated() {
        let temp = TempDir::new().unwrap();
        let mut cache = SchemaCache::default();

        assert!(cache.get(temp.path()).is_none());
        assert!(!cache.has(temp.path()));

        // Writing the file after the miss does not change the cached answer
        fs::write(
            temp.path().join("_schema.yml"),
            "options:\n  width:\n    type: number\n",
        )
        .unwrap();
        assert!(cache.get(temp.path()).is_none());

        // Invalidation forces a re-read
        cache.invalidate(temp.path());
        let schema = cache.get(temp.path()).unwrap();
        assert!(schema.options.as_ref().unwrap().contains_key("width"));
        assert!(cache.has(temp.path()));
    }

    #[test]
    fn test_parse_failure_is_memoised_as_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("_schema.yml"), "options: [broken").unwrap();

        let mut cache = SchemaCache::default();
        assert!(cache.get(temp.path()).is_none());
        assert!(cache.get_error(temp.path()).is_some());
        assert!(cache.has(temp.path()));

        // Fixing the file only takes effect after invalidation
        fs::write(temp.path().join("_schema.yml"), "options: {}\n").unwrap();
        assert!(cache.get(temp.path()).is_none());
        cache.invalidate(temp.path());
        assert!(cache.get(temp.path()).is_some());
        assert!(cache.get_error(temp.path()).is_none());
    }

    #[test]
    fn test_invalidate_all() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::write(a.path().join("_snippets.json"), r#"{"A":{"prefix":"a","body":"x"}}"#)
            .unwrap();

        let mut cache = SnippetCache::default();
        assert!(cache.get(a.path()).is_some());
        assert!(cache.get(b.path()).is_none());

        cache.invalidate_all();
        fs::write(b.path().join("_snippets.json"), r#"{"B":{"prefix":"b","body":"y"}}"#)
            .unwrap();
        assert!(cache.get(b.path()).is_some());
        assert!(cache.get(a.path()).is_some());
    }
}
