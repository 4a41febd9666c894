//! Update application
//!
//! Replays each pending update through the install path with overwrite
//! forced. The recorded source is re-targeted first: a pinned GitHub ref
//! names the revision that is already installed, so replaying it verbatim
//! would be a no-op. After a successful install the manifest's `source:` is
//! stamped again, since the incoming manifest overwrote the stamped one.
//! Updates are independent: one failure lands in `failed` with its error
//! message and the rest still run.

use crate::checker::{UpdateInfo, UpdateMode};
use quartex_core::manifest::stamp_manifest_source;
use quartex_core::types::registry::RegistrySnapshot;
use quartex_core::types::source::{format_install_source, parse_install_source};
use quartex_core::types::{ExtensionId, InstallSource, VersionSpec};
use quartex_install::{install_extensions, OverwriteAll};
use quartex_staging::StageOptions;
use std::path::Path;
use tracing::{info, warn};

/// One update that could not be applied
#[derive(Debug, Clone)]
pub struct FailedUpdate {
    pub id: ExtensionId,
    pub error: String,
}

/// Outcome of applying a batch of updates
#[derive(Debug, Default)]
pub struct UpdateResult {
    pub applied: Vec<UpdateInfo>,
    pub failed: Vec<FailedUpdate>,
}

/// Point a recorded source at the revision the update advertises
///
/// Commit mode pins the registry's new head; semver mode drops the pin so
/// staging resolves the latest release tag. Non-GitHub sources carry no pin
/// and pass through unchanged.
fn retarget_source(update: &UpdateInfo) -> InstallSource {
    match parse_install_source(&update.source) {
        InstallSource::Github { owner, repo, .. } => {
            let version = match update.mode {
                UpdateMode::Commit => Some(VersionSpec::Commit(update.available.clone())),
                UpdateMode::Semver => None,
            };
            InstallSource::Github {
                owner,
                repo,
                version,
            }
        }
        other => other,
    }
}

/// Apply each update by reinstalling its source with overwrite forced
pub async fn apply_updates(
    updates: &[UpdateInfo],
    project_dir: &Path,
    registry: Option<&RegistrySnapshot>,
    stage_opts: &StageOptions,
) -> UpdateResult {
    let mut result = UpdateResult::default();

    for update in updates {
        let source = retarget_source(update);
        match install_extensions(
            &source,
            project_dir,
            registry,
            &mut OverwriteAll,
            stage_opts,
        )
        .await
        {
            Ok(outcome) => {
                // The incoming manifest clobbered the stamped source; write
                // it back so the next check still finds the registry entry
                let stamp = match &source {
                    InstallSource::Github { .. } => format_install_source(&source),
                    _ => update.source.clone(),
                };
                for extension in &outcome.installed {
                    if let Err(e) =
                        stamp_manifest_source(&extension.manifest_path, &stamp)
                    {
                        warn!("Could not record source for {}: {}", extension.id, e);
                    }
                }
                info!("Updated {} to {}", update.id, update.available);
                result.applied.push(update.clone());
            }
            Err(e) => {
                warn!("Failed to update {}: {}", update.id, e);
                result.failed.push(FailedUpdate {
                    id: update.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_extension(root: &Path, rel: &str, version: &str) {
        let dir = root.join("_extensions").join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("_extension.yml"),
            format!("title: Demo\nversion: {version}\n"),
        )
        .unwrap();
    }

    fn update_for(id: &str, source: &str) -> UpdateInfo {
        UpdateInfo {
            id: quartex_core::types::parse_extension_id(id).unwrap(),
            source: source.to_string(),
            installed: "1.0.0".to_string(),
            available: "2.0.0".to_string(),
            mode: UpdateMode::Semver,
        }
    }

    #[test]
    fn test_commit_pinned_source_retargets_to_new_head() {
        let update = UpdateInfo {
            id: quartex_core::types::parse_extension_id("acme/theme").unwrap(),
            source: "acme/theme@abc1234".to_string(),
            installed: "abc1234".to_string(),
            available: "deadbee".to_string(),
            mode: UpdateMode::Commit,
        };

        // Replaying the recorded pin would reinstall the old commit
        assert_eq!(
            retarget_source(&update),
            InstallSource::Github {
                owner: "acme".to_string(),
                repo: "theme".to_string(),
                version: Some(VersionSpec::Commit("deadbee".to_string())),
            }
        );
    }

    #[test]
    fn test_tag_pinned_source_drops_pin_for_semver_update() {
        let update = update_for("acme/theme", "acme/theme@v1.0.0");

        assert_eq!(
            retarget_source(&update),
            InstallSource::Github {
                owner: "acme".to_string(),
                repo: "theme".to_string(),
                version: None,
            }
        );
    }

    #[test]
    fn test_local_source_passes_through_unchanged() {
        let update = update_for("demo", "/some/local/tree");
        assert_eq!(
            retarget_source(&update),
            InstallSource::Local {
                path: "/some/local/tree".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_apply_restamps_recorded_source() {
        let source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        seed_extension(source.path(), "good", "2.0.0");
        seed_extension(project.path(), "good", "1.0.0");

        let source_str = source.path().to_str().unwrap().to_string();
        let updates = vec![update_for("good", &source_str)];
        let result = apply_updates(&updates, project.path(), None, &StageOptions::default())
            .await;
        assert_eq!(result.applied.len(), 1);

        // The replayed manifest carries no source; the stamp restores it so
        // the extension stays visible to later update checks
        let manifest = fs::read_to_string(
            project.path().join("_extensions/good/_extension.yml"),
        )
        .unwrap();
        assert!(manifest.contains("version: 2.0.0"));
        assert!(manifest.contains(&format!("source: {source_str}")));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let good_source = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        seed_extension(good_source.path(), "good", "2.0.0");
        seed_extension(project.path(), "good", "1.0.0");

        let updates = vec![
            update_for("broken", "/nonexistent/quartex-update-source"),
            update_for("good", good_source.path().to_str().unwrap()),
        ];

        let result = apply_updates(&updates, project.path(), None, &StageOptions::default())
            .await;

        assert_eq!(result.applied.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].id.to_string(), "broken");
        assert!(!result.failed[0].error.is_empty());

        // The good update really was forced through
        let manifest = fs::read_to_string(
            project.path().join("_extensions/good/_extension.yml"),
        )
        .unwrap();
        assert!(manifest.contains("2.0.0"));
    }
}
