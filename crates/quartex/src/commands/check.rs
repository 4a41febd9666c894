//! Check for available updates

use anyhow::{anyhow, Context, Result};
use owo_colors::OwoColorize;
use quartex_discovery::scan_project;
use quartex_update::{check_for_updates, UpdateMode};
use tabled::{settings::Style, Table, Tabled};

use super::common;
use crate::cli::CheckArgs;
use crate::output;

#[derive(Tabled)]
struct UpdateRow {
    id: String,
    installed: String,
    available: String,
    #[tabled(rename = "via")]
    mode: String,
}

pub async fn run(args: CheckArgs) -> Result<()> {
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
        registry.ok_or_else(|| anyhow!("registry unavailable; cannot check for updates"))?;

    let updates = check_for_updates(&installed, &registry);
    if updates.is_empty() {
        output::success("All extensions are up to date");
        return Ok(());
    }

    let rows: Vec<UpdateRow> = updates
        .iter()
        .map(|update| UpdateRow {
            id: update.id.to_string(),
            installed: update.installed.yellow().to_string(),
            available: update.available.green().to_string(),
            mode: match update.mode {
                UpdateMode::Commit => "commit".to_string(),
                UpdateMode::Semver => "semver".to_string(),
            },
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    println!("{table}");
    output::info(&format!(
        "{} update(s) available; run `quartex update` to apply",
        updates.len()
    ));
    Ok(())
}
