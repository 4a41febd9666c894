//! Update checking and application for Quartex
//!
//! This crate handles:
//! - Detecting available updates for installed extensions against a
//!   registry snapshot (commit-pin and semver comparison modes)
//! - Applying pending updates through the forced install path

pub mod apply;
pub mod checker;

pub use apply::{apply_updates, FailedUpdate, UpdateResult};
pub use checker::{check_for_updates, UpdateInfo, UpdateMode};
