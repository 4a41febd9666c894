//! Two-phase template "use" flow
//!
//! Phase one is a dry run against the staged tree: list candidate files, let
//! the caller select a subset, confirm bundled-extension install, and resolve
//! overwrite conflicts, all before a single byte lands in the project. A
//! bundled extension whose target directory already exists counts as a
//! conflict too, surfaced through the same hook as conflicting files. Phase
//! two replays the decisions: copy the selected files, then install the
//! confirmed extensions straight from the same staged tree, keeping any the
//! resolution chose not to overwrite. Cancelling at any phase-one hook
//! unwinds with zero filesystem side effects beyond scratch cleanup.

use crate::copy::{copy_with_resolution, find_conflicts};
use crate::install::install_one;
use crate::plan::list_template_files;
use crate::policy::{OverwriteAll, Resolution};
use crate::report::OperationReport;
use quartex_core::error::Result;
use quartex_core::types::registry::RegistrySnapshot;
use quartex_core::types::{ExtensionId, InstallSource, InstalledExtension};
use quartex_discovery::find_all_extension_roots;
use quartex_staging::{stage_source, StageOptions, StagedSource};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Caller's answer to the file-selection hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Subset(BTreeSet<PathBuf>),
    Cancelled,
}

/// Caller's answer to a yes/no hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
    Cancelled,
}

/// Interactive hooks for the select-before-install flow
///
/// Defaults describe the non-interactive behaviour: take every file, install
/// bundled extensions, never overwrite.
pub trait UseInteraction {
    fn select_files(&mut self, _files: &[PathBuf]) -> Selection {
        Selection::All
    }

    fn confirm_extensions(&mut self, _extensions: &[ExtensionId]) -> Confirmation {
        Confirmation::Accepted
    }

    fn resolve_conflicts(&mut self, _conflicts: &[PathBuf]) -> Resolution {
        Resolution::None
    }
}

/// Non-interactive flow with an optional blanket overwrite
pub struct NonInteractive {
    pub overwrite_all: bool,
}

impl UseInteraction for NonInteractive {
    fn resolve_conflicts(&mut self, _conflicts: &[PathBuf]) -> Resolution {
        if self.overwrite_all {
            Resolution::All
        } else {
            Resolution::None
        }
    }
}

/// Result of a template use operation
#[derive(Debug)]
pub struct UseOutcome {
    pub report: OperationReport,
    /// Bundled extensions installed alongside the template files
    pub installed: Vec<InstalledExtension>,
}

impl UseOutcome {
    fn cancelled() -> Self {
        UseOutcome {
            report: OperationReport::cancelled(),
            installed: Vec::new(),
        }
    }
}

/// Copy a template source into a project through the caller's hooks
///
/// Scratch cleanup runs on success, failure, and cancellation alike.
pub async fn use_template(
    source: &InstallSource,
    project_dir: &Path,
    subdir: Option<&Path>,
    registry: Option<&RegistrySnapshot>,
    interaction: &mut dyn UseInteraction,
    stage_opts: &StageOptions,
) -> Result<UseOutcome> {
    let staged = stage_source(source, registry, stage_opts).await?;
    let result = run_use_flow(&staged, project_dir, subdir, interaction);
    staged.cleanup();
    result
}

fn run_use_flow(
    staged: &StagedSource,
    project_dir: &Path,
    subdir: Option<&Path>,
    interaction: &mut dyn UseInteraction,
) -> Result<UseOutcome> {
    let target_dir = match subdir {
        Some(sub) => project_dir.join(sub),
        None => project_dir.to_path_buf(),
    };

    // Phase one: decisions only, no writes
    let candidates = list_template_files(&staged.staged_dir, &[], &[])?;
    let selected = match interaction.select_files(&candidates) {
        Selection::All => candidates.clone(),
        Selection::Subset(chosen) => candidates
            .iter()
            .filter(|f| chosen.contains(f.as_path()))
            .cloned()
            .collect(),
        Selection::Cancelled => return Ok(UseOutcome::cancelled()),
    };

    let extension_roots = find_all_extension_roots(&staged.staged_dir)?;
    let install_bundled = if extension_roots.is_empty() {
        false
    } else {
        let ids: Vec<ExtensionId> = extension_roots.iter().map(|r| r.id.clone()).collect();
        match interaction.confirm_extensions(&ids) {
            Confirmation::Accepted => true,
            Confirmation::Declined => false,
            Confirmation::Cancelled => return Ok(UseOutcome::cancelled()),
        }
    };

    // An already-installed bundled extension is a conflict like any other:
    // it must be surfaced before phase two writes a single byte
    let extension_conflicts: BTreeSet<PathBuf> = if install_bundled {
        extension_roots
            .iter()
            .filter(|root| project_dir.join(&root.relative_path).exists())
            .map(|root| root.relative_path.clone())
            .collect()
    } else {
        BTreeSet::new()
    };

    let mut conflicts = find_conflicts(&target_dir, &selected);
    conflicts.extend(extension_conflicts.iter().cloned());
    let resolution = if conflicts.is_empty() {
        Resolution::All
    } else {
        match interaction.resolve_conflicts(&conflicts) {
            Resolution::Cancelled => return Ok(UseOutcome::cancelled()),
            resolution => resolution,
        }
    };

    // Phase two: replay the decisions
    debug!(
        "Copying {} selected template file(s) into {:?}",
        selected.len(),
        target_dir
    );
    let outcome = copy_with_resolution(&staged.staged_dir, &target_dir, &selected, &resolution)?;

    let mut report = OperationReport::completed();
    report.created = outcome.created;
    report.overwritten = outcome.overwritten;
    report.skipped = outcome.skipped;

    // Deselected files that already exist in the project stay visible in
    // the report instead of vanishing
    let selected_set: BTreeSet<&PathBuf> = selected.iter().collect();
    for candidate in &candidates {
        if !selected_set.contains(candidate) && target_dir.join(candidate).exists() {
            report.skipped.push(candidate.clone());
        }
    }

    let mut installed = Vec::new();
    if install_bundled {
        // Replay the already-staged roots; the set was confirmed in phase
        // one, so only the conflict resolution can still hold one back
        for root in &extension_roots {
            if extension_conflicts.contains(&root.relative_path)
                && !resolution.allows(&root.relative_path)
            {
                debug!("Keeping existing extension {}", root.id);
                report.skipped.push(root.relative_path.clone());
                continue;
            }
            if let Some((one, extension)) =
                install_one(root, project_dir, &mut OverwriteAll)?
            {
                report.absorb(one);
                installed.push(extension);
            }
        }
    }

    Ok(UseOutcome { report, installed })
}
