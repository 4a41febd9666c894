//! End-to-end pipeline tests: staging, discovery, reconciliation, and
//! update checking working together against real directories and a mock
//! archive server.

use quartex_core::manifest::stamp_manifest_source;
use quartex_core::types::registry::{RegistryEntry, RegistrySnapshot};
use quartex_core::types::{ExtensionId, InstallSource};
use quartex_discovery::scan_project;
use quartex_install::{install_extensions, use_brand, OverwriteAll, SkipAll};
use quartex_integration_tests::{build_tarball, seed_extension};
use quartex_staging::StageOptions;
use quartex_update::{apply_updates, check_for_updates, UpdateMode};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local(path: &Path) -> InstallSource {
    InstallSource::Local {
        path: path.to_path_buf(),
    }
}

fn registry_with(key: &str, latest_tag: &str) -> RegistrySnapshot {
    let (owner, name) = key.split_once('/').unwrap();
    let mut snapshot = RegistrySnapshot::new();
    snapshot.insert(
        key.to_string(),
        RegistryEntry {
            id: key.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: key.to_string(),
            description: None,
            topics: vec![],
            latest_version: Some(RegistryEntry::version_from_tag(latest_tag)),
            latest_tag: Some(latest_tag.to_string()),
            latest_release_url: None,
            stars: 0,
            licence: None,
            html_url: format!("https://github.com/{key}"),
            template: false,
            template_content: None,
            default_branch_ref: Some("main".to_string()),
            last_commit: None,
        },
    );
    snapshot
}

#[tokio::test]
async fn test_install_scan_check_update_lifecycle() {
    let source_v1 = TempDir::new().unwrap();
    let source_v2 = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    seed_extension(source_v1.path(), "acme/demo", "1.0.0");
    seed_extension(source_v2.path(), "acme/demo", "2.0.0");

    // Install v1 and record where it came from; the v2 tree doubles as the
    // registry key so the whole round trip runs against local directories
    let source_key = source_v2.path().to_str().unwrap().to_string();
    let outcome = install_extensions(
        &local(source_v1.path()),
        project.path(),
        None,
        &mut SkipAll,
        &StageOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.installed.len(), 1);
    stamp_manifest_source(&outcome.installed[0].manifest_path, &source_key).unwrap();

    // The scan sees the stamped manifest
    let installed = scan_project(project.path()).unwrap();
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].id, ExtensionId::owned("acme", "demo"));
    assert_eq!(installed[0].manifest.source.as_deref(), Some(source_key.as_str()));

    // The registry offers v2
    let registry = registry_with(&source_key, "v2.0.0");
    let updates = check_for_updates(&installed, &registry);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].mode, UpdateMode::Semver);
    assert_eq!(updates[0].available, "2.0.0");

    // Apply the updates exactly as detected
    let result = apply_updates(
        &updates,
        project.path(),
        Some(&registry),
        &StageOptions::default(),
    )
    .await;
    assert_eq!(result.applied.len(), 1);
    assert!(result.failed.is_empty());

    // The new version landed and the source survived the overwrite, so a
    // follow-up check still resolves the registry entry
    let installed = scan_project(project.path()).unwrap();
    assert_eq!(installed[0].manifest.version.as_deref(), Some("2.0.0"));
    assert_eq!(installed[0].manifest.source.as_deref(), Some(source_key.as_str()));
    assert!(check_for_updates(&installed, &registry).is_empty());
}

#[tokio::test]
async fn test_install_from_archive_url_unwraps_single_root() {
    let archive = build_tarball(&[
        (
            "repo-main/_extensions/demo/_extension.yml",
            "title: Demo\nversion: 1.0.0\n",
        ),
        ("repo-main/_extensions/demo/demo.lua", "-- demo"),
        ("repo-main/README.md", "ignored by the extension copy"),
    ]);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(&server)
        .await;

    let project = TempDir::new().unwrap();
    let outcome = install_extensions(
        &InstallSource::Url {
            url: format!("{}/archive.tar.gz", server.uri()),
        },
        project.path(),
        None,
        &mut SkipAll,
        &StageOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.installed.len(), 1);
    assert_eq!(outcome.installed[0].id, ExtensionId::unowned("demo"));
    assert!(project.path().join("_extensions/demo/demo.lua").exists());
    // The wrapper directory name never leaks into the project
    assert!(!project.path().join("repo-main").exists());
}

#[tokio::test]
async fn test_brand_from_extension_declaration_with_cleanup() {
    let source = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let ext_dir = source.path().join("_extensions/acme/brandkit");
    fs::create_dir_all(ext_dir.join("logos")).unwrap();
    fs::write(
        ext_dir.join("_extension.yml"),
        "title: Brandkit\ncontributes:\n  metadata:\n    project:\n      brand: brand.yml\n",
    )
    .unwrap();
    fs::write(
        ext_dir.join("brand.yml"),
        "logo:\n  small: logos/mark.svg\n",
    )
    .unwrap();
    fs::write(ext_dir.join("logos/mark.svg"), "<svg/>").unwrap();

    // Leftover from a previous brand install
    fs::create_dir_all(project.path().join("_brand/old")).unwrap();
    fs::write(project.path().join("_brand/old/banner.png"), "stale").unwrap();

    let mut confirm = |_: &[PathBuf]| true;
    let report = use_brand(
        &local(source.path()),
        project.path(),
        None,
        &mut OverwriteAll,
        Some(&mut confirm),
        &StageOptions::default(),
    )
    .await
    .unwrap();

    assert!(project.path().join("_brand/_brand.yml").exists());
    assert!(project.path().join("_brand/logos/mark.svg").exists());
    assert!(!project.path().join("_brand/old/banner.png").exists());
    assert!(!project.path().join("_brand/old").exists());
    assert_eq!(report.cleaned, vec![PathBuf::from("old/banner.png")]);
}
