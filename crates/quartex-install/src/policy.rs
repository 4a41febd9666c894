//! Conflict resolution policy
//!
//! When a reconciliation operation would write over files that already
//! exist, the whole conflict set is handed to a single [`ConflictPolicy`]
//! before anything touches disk. Interactive frontends plug in prompts;
//! non-interactive callers pass `--force` style presets. Precedence when
//! assembling a policy from caller options: overwrite-all, then a batch
//! callback, then a per-file callback, then skip-all.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Outcome of resolving a conflict set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Overwrite every conflicting file
    All,
    /// Keep every existing file
    None,
    /// Overwrite exactly these files, keep the rest
    Subset(BTreeSet<PathBuf>),
    /// Abort the whole operation before any write
    Cancelled,
}

impl Resolution {
    /// Whether this particular file should be overwritten
    pub fn allows(&self, path: &Path) -> bool {
        match self {
            Resolution::All => true,
            Resolution::None | Resolution::Cancelled => false,
            Resolution::Subset(chosen) => chosen.contains(path),
        }
    }
}

/// Per-file answer used by [`PerFilePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDecision {
    Overwrite,
    Skip,
    Cancel,
}

/// Decides the fate of an entire conflict set in one call
pub trait ConflictPolicy {
    fn resolve(&mut self, conflicts: &[PathBuf]) -> Resolution;
}

/// Overwrite everything without asking
pub struct OverwriteAll;

impl ConflictPolicy for OverwriteAll {
    fn resolve(&mut self, _conflicts: &[PathBuf]) -> Resolution {
        Resolution::All
    }
}

/// Keep every existing file without asking
pub struct SkipAll;

impl ConflictPolicy for SkipAll {
    fn resolve(&mut self, _conflicts: &[PathBuf]) -> Resolution {
        Resolution::None
    }
}

/// One decision for the whole batch
pub struct BatchPolicy<F>(pub F)
where
    F: FnMut(&[PathBuf]) -> Resolution;

impl<F> ConflictPolicy for BatchPolicy<F>
where
    F: FnMut(&[PathBuf]) -> Resolution,
{
    fn resolve(&mut self, conflicts: &[PathBuf]) -> Resolution {
        (self.0)(conflicts)
    }
}

/// Ask file by file; a single cancel answer aborts the operation
pub struct PerFilePolicy<F>(pub F)
where
    F: FnMut(&Path) -> FileDecision;

impl<F> ConflictPolicy for PerFilePolicy<F>
where
    F: FnMut(&Path) -> FileDecision,
{
    fn resolve(&mut self, conflicts: &[PathBuf]) -> Resolution {
        let mut chosen = BTreeSet::new();
        for path in conflicts {
            match (self.0)(path) {
                FileDecision::Overwrite => {
                    chosen.insert(path.clone());
                }
                FileDecision::Skip => {}
                FileDecision::Cancel => return Resolution::Cancelled,
            }
        }
        if chosen.len() == conflicts.len() {
            Resolution::All
        } else if chosen.is_empty() {
            Resolution::None
        } else {
            Resolution::Subset(chosen)
        }
    }
}

/// Callback deciding a whole batch at once
pub type BatchConfirm = Box<dyn FnMut(&[PathBuf]) -> Resolution>;

/// Callback deciding one file at a time
pub type FileConfirm = Box<dyn FnMut(&Path) -> FileDecision>;

/// Build a policy from caller-supplied options
///
/// `overwrite_all` wins over any callback; a batch callback wins over a
/// per-file one; with nothing supplied every conflict is skipped.
pub fn policy_from_options(
    overwrite_all: bool,
    batch: Option<BatchConfirm>,
    per_file: Option<FileConfirm>,
) -> Box<dyn ConflictPolicy> {
    if overwrite_all {
        return Box::new(OverwriteAll);
    }
    if let Some(batch) = batch {
        return Box::new(BatchPolicy(batch));
    }
    if let Some(per_file) = per_file {
        return Box::new(PerFilePolicy(per_file));
    }
    Box::new(SkipAll)
}
