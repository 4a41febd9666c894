//! Interactive prompts implementing the library's policy and interaction
//! traits with dialoguer
//!
//! A failed or interrupted prompt (Esc, closed TTY) is treated as
//! cancellation rather than an error, so Ctrl-C style bail-outs unwind the
//! operation cleanly.

use dialoguer::{Confirm, MultiSelect, Select};
use quartex_core::types::ExtensionId;
use quartex_install::{
    BatchConfirm, ConflictPolicy, Confirmation, OverwriteAll, Resolution, Selection, SkipAll,
    UseInteraction,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::output;

/// One batch conflict prompt: overwrite all, keep all, pick, or cancel
fn prompt_conflicts(conflicts: &[PathBuf]) -> Resolution {
    output::warning(&format!(
        "{} file(s) already exist in the project",
        conflicts.len()
    ));

    let choice = Select::new()
        .with_prompt("How should existing files be handled?")
        .items(&["Overwrite all", "Keep all", "Choose per file", "Cancel"])
        .default(1)
        .interact();

    match choice {
        Ok(0) => Resolution::All,
        Ok(1) => Resolution::None,
        Ok(2) => {
            let labels: Vec<String> = conflicts
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            match MultiSelect::new()
                .with_prompt("Select files to overwrite")
                .items(&labels)
                .interact()
            {
                Ok(picked) => {
                    let chosen: BTreeSet<PathBuf> =
                        picked.into_iter().map(|i| conflicts[i].clone()).collect();
                    if chosen.is_empty() {
                        Resolution::None
                    } else {
                        Resolution::Subset(chosen)
                    }
                }
                Err(_) => Resolution::Cancelled,
            }
        }
        _ => Resolution::Cancelled,
    }
}

/// Build the conflict policy for non-select commands
///
/// `--force` overwrites everything, `--yes` keeps everything, otherwise the
/// batch prompt decides.
pub fn conflict_policy(force: bool, yes: bool) -> Box<dyn ConflictPolicy> {
    if force {
        return Box::new(OverwriteAll);
    }
    if yes {
        return Box::new(SkipAll);
    }
    let batch: BatchConfirm = Box::new(|conflicts: &[PathBuf]| prompt_conflicts(conflicts));
    quartex_install::policy_from_options(false, Some(batch), None)
}

/// Interactive hooks for the template "use" flow
pub struct PromptedUse {
    pub force: bool,
    pub yes: bool,
}

impl UseInteraction for PromptedUse {
    fn select_files(&mut self, files: &[PathBuf]) -> Selection {
        if self.force || self.yes {
            return Selection::All;
        }

        let labels: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        let defaults = vec![true; labels.len()];
        match MultiSelect::new()
            .with_prompt("Select template files to copy")
            .items(&labels)
            .defaults(&defaults)
            .interact()
        {
            Ok(picked) if picked.len() == files.len() => Selection::All,
            Ok(picked) => Selection::Subset(
                picked.into_iter().map(|i| files[i].clone()).collect(),
            ),
            Err(_) => Selection::Cancelled,
        }
    }

    fn confirm_extensions(&mut self, extensions: &[ExtensionId]) -> Confirmation {
        if self.force || self.yes {
            return Confirmation::Accepted;
        }

        for id in extensions {
            output::kv("extension", &id.to_string());
        }
        match Confirm::new()
            .with_prompt(format!(
                "Install {} bundled extension(s)?",
                extensions.len()
            ))
            .default(true)
            .interact()
        {
            Ok(true) => Confirmation::Accepted,
            Ok(false) => Confirmation::Declined,
            Err(_) => Confirmation::Cancelled,
        }
    }

    fn resolve_conflicts(&mut self, conflicts: &[PathBuf]) -> Resolution {
        if self.force {
            return Resolution::All;
        }
        if self.yes {
            return Resolution::None;
        }
        prompt_conflicts(conflicts)
    }
}

/// Confirmation callback for brand stale-file cleanup
pub fn cleanup_prompt(assume_yes: bool) -> impl FnMut(&[PathBuf]) -> bool {
    move |stale: &[PathBuf]| {
        if assume_yes {
            return true;
        }
        output::warning(&format!(
            "{} file(s) under _brand no longer belong to this brand",
            stale.len()
        ));
        for path in stale {
            output::kv("stale", &path.display().to_string());
        }
        Confirm::new()
            .with_prompt("Delete them?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
