//! Apply available updates

use anyhow::{anyhow, Context, Result};
use quartex_discovery::scan_project;
use quartex_update::{apply_updates, check_for_updates};

use super::common;
use crate::cli::UpdateArgs;
use crate::output;

pub async fn run(args: UpdateArgs) -> Result<()> {
    let installed = scan_project(&args.dir)
        .with_context(|| format!("failed to scan {}", args.dir.display()))?;
    if installed.is_empty() {
        output::info("No extensions installed");
        return Ok(());
    }

    let spinner = output::spinner("Fetching registry...");
    let registry = common::load_registry(&args.network).await;
    spinner.finish_and_clear();
    let registry =
        registry.ok_or_else(|| anyhow!("registry unavailable; cannot update"))?;

    let mut updates = check_for_updates(&installed, &registry);
    if !args.extensions.is_empty() {
        updates.retain(|update| {
            args.extensions.iter().any(|wanted| {
                update.id.to_string().eq_ignore_ascii_case(wanted)
                    || update.id.name.eq_ignore_ascii_case(wanted)
            })
        });
    }

    if updates.is_empty() {
        output::success("Nothing to update");
        return Ok(());
    }

    for update in &updates {
        output::kv(
            &update.id.to_string(),
            &format!("{} -> {}", update.installed, update.available),
        );
    }

    let result = apply_updates(
        &updates,
        &args.dir,
        Some(&registry),
        &common::stage_options(&args.network),
    )
    .await;

    if !result.applied.is_empty() {
        output::success(&format!("Updated {} extension(s)", result.applied.len()));
    }
    for failed in &result.failed {
        output::error(&format!("{}: {}", failed.id, failed.error));
    }
    if result.failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} update(s) failed", result.failed.len()))
    }
}
