//! # quartex-core
//!
//! Core library for the Quartex CLI providing:
//! - Install source parsing (GitHub refs, URLs, local paths)
//! - Extension identifiers and manifest parsing
//! - Registry entry types
//! - Shared error types

pub mod error;
pub mod manifest;
pub mod types;

pub use error::{Error, Result};
pub use manifest::{parse_manifest, parse_manifest_str, stamp_manifest_source, ExtensionManifest};
pub use types::{
    format_install_source, parse_extension_id, parse_install_source, parse_version_spec,
    DiscoveredExtension, ExtensionId, InstallSource, InstalledExtension, RegistryEntry,
    VersionSpec,
};
