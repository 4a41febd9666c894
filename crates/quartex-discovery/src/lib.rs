//! Extension and brand discovery for Quartex
//!
//! This crate handles:
//! - Finding extension manifests in a staged tree (`_extensions/*` and
//!   nested `_extensions/owner/name` layouts)
//! - Scanning a project's installed extensions
//! - Brand file detection and brand asset path extraction

pub mod brand;
pub mod extensions;

pub use brand::{
    check_for_brand_extension, extract_brand_file_paths, find_brand_file, BrandExtensionInfo,
    BrandFileInfo,
};
pub use extensions::{find_all_extension_roots, scan_project};
