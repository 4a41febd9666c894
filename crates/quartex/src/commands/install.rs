//! Extension install command

use anyhow::{Context, Result};
use quartex_core::manifest::stamp_manifest_source;
use quartex_core::types::source::{format_install_source, parse_install_source};
use quartex_core::types::InstallSource;
use quartex_install::install_extensions;
use tracing::warn;

use super::common;
use crate::cli::InstallArgs;
use crate::output;
use crate::prompts;

pub async fn run(args: InstallArgs) -> Result<()> {
    let source = parse_install_source(&args.source);
    let registry = common::load_registry(&args.network).await;
    let mut policy = prompts::conflict_policy(args.force, args.yes);

    output::info(&format!("Installing from {}", args.source));
    let outcome = install_extensions(
        &source,
        &args.dir,
        registry.as_ref(),
        policy.as_mut(),
        &common::stage_options(&args.network),
    )
    .await
    .with_context(|| format!("failed to install from {}", args.source))?;

    output::report_summary(&outcome.report);
    if outcome.report.is_cancelled() {
        return Ok(());
    }

    // Stamp provenance so later update checks can find the registry entry
    if matches!(source, InstallSource::Github { .. }) {
        let stamp = format_install_source(&source);
        for extension in &outcome.installed {
            if let Err(e) = stamp_manifest_source(&extension.manifest_path, &stamp) {
                warn!("Could not record source for {}: {}", extension.id, e);
            }
        }
    }

    for extension in &outcome.installed {
        let version = extension.manifest.version.as_deref().unwrap_or("-");
        output::kv(&extension.id.to_string(), version);
    }
    Ok(())
}
