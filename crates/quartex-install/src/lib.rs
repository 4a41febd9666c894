//! Reconciliation engine for Quartex
//!
//! This crate handles:
//! - Extension install from any staged source into `<project>/_extensions`
//! - The two-phase template "use" flow (select, confirm, then write)
//! - Brand install into `<project>/_brand` with traversal-checked assets and
//!   stale-file cleanup
//! - Conflict resolution policies shared by all three operations

pub mod brand;
pub mod copy;
pub mod install;
pub mod plan;
pub mod policy;
pub mod report;
pub mod template;

pub use brand::{use_brand, CleanupConfirm, BRAND_DIR, BRAND_TARGET_FILE};
pub use copy::{copy_files, CopyOutcome, CopyStep};
pub use install::{install_extensions, InstallOutcome};
pub use plan::{list_extension_files, list_template_files};
pub use policy::{
    policy_from_options, BatchConfirm, ConflictPolicy, FileConfirm, FileDecision, OverwriteAll,
    Resolution, SkipAll,
};
pub use report::{OperationReport, OperationStatus};
pub use template::{
    use_template, Confirmation, NonInteractive, Selection, UseInteraction, UseOutcome,
};
