//! Operation reports
//!
//! Every reconciliation operation returns an [`OperationReport`] describing
//! what actually happened on disk. Paths are relative to the operation's
//! target directory so callers can render them without knowing where the
//! project lives.

use std::path::PathBuf;

/// Terminal status of a reconciliation operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// The operation ran to completion (individual files may still have
    /// been skipped).
    Completed,
    /// The user backed out before any file was written.
    Cancelled,
}

/// What a reconciliation operation did on disk
#[derive(Debug, Clone)]
pub struct OperationReport {
    pub status: OperationStatus,
    /// Files written where nothing existed before
    pub created: Vec<PathBuf>,
    /// Files written over an existing file
    pub overwritten: Vec<PathBuf>,
    /// Files deliberately left alone (conflict resolution or deselection)
    pub skipped: Vec<PathBuf>,
    /// Stale files removed by cleanup
    pub cleaned: Vec<PathBuf>,
}

impl OperationReport {
    pub fn completed() -> Self {
        OperationReport {
            status: OperationStatus::Completed,
            created: Vec::new(),
            overwritten: Vec::new(),
            skipped: Vec::new(),
            cleaned: Vec::new(),
        }
    }

    pub fn cancelled() -> Self {
        OperationReport {
            status: OperationStatus::Cancelled,
            ..OperationReport::completed()
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OperationStatus::Cancelled
    }

    /// Total number of files written (created plus overwritten)
    pub fn written_count(&self) -> usize {
        self.created.len() + self.overwritten.len()
    }

    /// Fold another report's file lists into this one
    pub fn absorb(&mut self, other: OperationReport) {
        self.created.extend(other.created);
        self.overwritten.extend(other.overwritten);
        self.skipped.extend(other.skipped);
        self.cleaned.extend(other.cleaned);
    }
}
