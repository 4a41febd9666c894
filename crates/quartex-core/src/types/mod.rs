//! Type definitions for install sources, extensions, and registry entries

pub mod extension;
pub mod registry;
pub mod source;

pub use extension::{parse_extension_id, DiscoveredExtension, ExtensionId, InstalledExtension};
pub use registry::{lookup_entry, RegistryEntry, RegistrySnapshot};
pub use source::{
    format_install_source, parse_install_source, parse_version_spec, InstallSource, VersionSpec,
};
