//! List installed extensions

use anyhow::{Context, Result};
use quartex_discovery::scan_project;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::ListArgs;
use crate::output;

#[derive(Tabled, serde::Serialize)]
struct ExtensionRow {
    id: String,
    title: String,
    version: String,
    contributes: String,
    source: String,
}

pub fn run(args: ListArgs) -> Result<()> {
    let installed = scan_project(&args.dir)
        .with_context(|| format!("failed to scan {}", args.dir.display()))?;

    if installed.is_empty() {
        output::info("No extensions installed");
        return Ok(());
    }

    let mut rows: Vec<ExtensionRow> = installed
        .iter()
        .map(|extension| ExtensionRow {
            id: extension.id.to_string(),
            title: extension.manifest.title.clone().unwrap_or_default(),
            version: extension
                .manifest
                .version
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            contributes: extension
                .manifest
                .contributes
                .as_ref()
                .map(|c| c.kinds().join(", "))
                .unwrap_or_default(),
            source: extension.manifest.source.clone().unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        println!("{table}");
    }
    Ok(())
}
