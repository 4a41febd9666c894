//! Archive staging for Quartex
//!
//! This crate handles:
//! - Downloading archives for GitHub refs and direct URLs
//! - tar.gz extraction into scratch directories
//! - The single-root directory heuristic (with symlink containment)
//! - Registry snapshot fetch with a TTL file cache

pub mod download;
pub mod extract;
pub mod registry;
pub mod stage;

pub use download::ArchiveDownloader;
pub use extract::extract_archive;
pub use registry::RegistryClient;
pub use stage::{
    cleanup_extraction, resolve_staged_dir, stage_source, StageOptions, StagedSource,
};
