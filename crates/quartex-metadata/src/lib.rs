//! Metadata parsing and caching for Quartex
//!
//! This crate handles:
//! - Extension schema (`_schema.json`/`.yml`/`.yaml`) parsing and
//!   kebab-case normalisation
//! - Editor snippet (`_snippets.json`) parsing
//! - Per-directory caches with explicit invalidation and cached-error
//!   memoisation

pub mod cache;
pub mod schema;
pub mod snippets;

pub use cache::{DirectoryCache, LoadOutcome, MetadataLoader, SchemaCache, SnippetCache};
pub use schema::{
    parse_schema_file, CompletionSpec, Deprecation, ExtensionSchema, FieldDescriptor,
    ShortcodeSchema, TypeSpec, SCHEMA_CANDIDATES,
};
pub use snippets::{parse_snippet_content, Snippet, SnippetCollection, SNIPPET_FILE};
