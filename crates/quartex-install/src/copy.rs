//! Sequential copy step
//!
//! The single copy loop every operation funnels through. Conflicts are
//! resolved once, up front, against the whole conflict set; the loop itself
//! is policy-agnostic and sequential so prompts and results come out in a
//! stable order. An individual copy failure aborts the remaining loop and
//! propagates.

use crate::policy::{ConflictPolicy, Resolution};
use quartex_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What one copy step did, paths relative to the target directory
#[derive(Debug, Clone, Default)]
pub struct CopyOutcome {
    pub created: Vec<PathBuf>,
    pub overwritten: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// A copy step either runs or the policy aborts it before any write
#[derive(Debug)]
pub enum CopyStep {
    Done(CopyOutcome),
    Cancelled,
}

/// Files in `files` whose target already exists
pub fn find_conflicts(target_dir: &Path, files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|rel| target_dir.join(rel).exists())
        .cloned()
        .collect()
}

/// Copy `files` from `source_dir` into `target_dir` under a conflict policy
///
/// The policy is consulted once, only when conflicts exist.
pub fn copy_files(
    source_dir: &Path,
    target_dir: &Path,
    files: &[PathBuf],
    policy: &mut dyn ConflictPolicy,
) -> Result<CopyStep> {
    let conflicts = find_conflicts(target_dir, files);
    let resolution = if conflicts.is_empty() {
        Resolution::All
    } else {
        policy.resolve(&conflicts)
    };

    if resolution == Resolution::Cancelled {
        return Ok(CopyStep::Cancelled);
    }

    let outcome = copy_with_resolution(source_dir, target_dir, files, &resolution)?;
    Ok(CopyStep::Done(outcome))
}

/// Copy step with an already-decided overwrite resolution
///
/// Used directly by the two-phase select flow, where conflicts were resolved
/// against the staged tree before any write. `Cancelled` here behaves like
/// `None`: the caller is expected to have aborted earlier.
pub fn copy_with_resolution(
    source_dir: &Path,
    target_dir: &Path,
    files: &[PathBuf],
    resolution: &Resolution,
) -> Result<CopyOutcome> {
    let mut outcome = CopyOutcome::default();

    for rel in files {
        let target = target_dir.join(rel);
        let exists = target.exists();

        if exists && !resolution.allows(rel) {
            debug!("Keeping existing file {:?}", rel);
            outcome.skipped.push(rel.clone());
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source_dir.join(rel), &target)?;

        if exists {
            outcome.overwritten.push(rel.clone());
        } else {
            outcome.created.push(rel.clone());
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BatchPolicy, OverwriteAll, SkipAll};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn seed(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn rels(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_fresh_copy_creates_everything() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "a");
        seed(source.path(), "sub/b.txt", "b");

        let files = rels(&["a.txt", "sub/b.txt"]);
        let step = copy_files(source.path(), target.path(), &files, &mut SkipAll).unwrap();

        let CopyStep::Done(outcome) = step else {
            panic!("expected completion");
        };
        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.overwritten.is_empty());
        assert!(outcome.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(target.path().join("sub/b.txt")).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_second_run_without_overwrite_skips_everything() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "new");
        seed(source.path(), "b.txt", "new");

        let files = rels(&["a.txt", "b.txt"]);
        copy_files(source.path(), target.path(), &files, &mut SkipAll).unwrap();

        // Identical second run: nothing created, all candidates skipped
        let step = copy_files(source.path(), target.path(), &files, &mut SkipAll).unwrap();
        let CopyStep::Done(outcome) = step else {
            panic!("expected completion");
        };
        assert!(outcome.created.is_empty());
        assert!(outcome.overwritten.is_empty());
        assert_eq!(outcome.skipped, files);
        assert_eq!(fs::read_to_string(target.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_overwrite_all_replaces_conflicts() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "theirs");
        seed(target.path(), "a.txt", "mine");

        let files = rels(&["a.txt"]);
        let step =
            copy_files(source.path(), target.path(), &files, &mut OverwriteAll).unwrap();

        let CopyStep::Done(outcome) = step else {
            panic!("expected completion");
        };
        assert_eq!(outcome.overwritten, files);
        assert_eq!(
            fs::read_to_string(target.path().join("a.txt")).unwrap(),
            "theirs"
        );
    }

    #[test]
    fn test_batch_subset_overwrites_only_chosen() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "theirs");
        seed(source.path(), "b.txt", "theirs");
        seed(target.path(), "a.txt", "mine");
        seed(target.path(), "b.txt", "mine");

        let mut policy = BatchPolicy(|_: &[PathBuf]| {
            let mut chosen = BTreeSet::new();
            chosen.insert(PathBuf::from("a.txt"));
            Resolution::Subset(chosen)
        });

        let files = rels(&["a.txt", "b.txt"]);
        let step = copy_files(source.path(), target.path(), &files, &mut policy).unwrap();
        let CopyStep::Done(outcome) = step else {
            panic!("expected completion");
        };
        assert_eq!(outcome.overwritten, rels(&["a.txt"]));
        assert_eq!(outcome.skipped, rels(&["b.txt"]));
        assert_eq!(fs::read_to_string(target.path().join("b.txt")).unwrap(), "mine");
    }

    #[test]
    fn test_cancel_aborts_before_any_write() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "theirs");
        seed(source.path(), "new.txt", "theirs");
        seed(target.path(), "a.txt", "mine");

        let mut policy = BatchPolicy(|_: &[PathBuf]| Resolution::Cancelled);
        let files = rels(&["a.txt", "new.txt"]);
        let step = copy_files(source.path(), target.path(), &files, &mut policy).unwrap();

        assert!(matches!(step, CopyStep::Cancelled));
        assert!(!target.path().join("new.txt").exists());
        assert_eq!(fs::read_to_string(target.path().join("a.txt")).unwrap(), "mine");
    }

    #[test]
    fn test_policy_not_consulted_without_conflicts() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "x");

        let mut policy = BatchPolicy(|_: &[PathBuf]| panic!("no conflicts expected"));
        let files = rels(&["a.txt"]);
        let step = copy_files(source.path(), target.path(), &files, &mut policy).unwrap();
        assert!(matches!(step, CopyStep::Done(_)));
    }

    #[test]
    fn test_missing_source_file_aborts_and_propagates() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        seed(source.path(), "a.txt", "x");

        let files = rels(&["a.txt", "missing.txt"]);
        let err = copy_files(source.path(), target.path(), &files, &mut SkipAll);
        assert!(err.is_err());
        // The earlier file in the loop was still copied before the abort
        assert!(target.path().join("a.txt").exists());
    }
}
