//! Template use command (two-phase select flow)

use anyhow::{Context, Result};
use quartex_core::types::source::parse_install_source;
use quartex_install::use_template;

use super::common;
use crate::cli::UseArgs;
use crate::output;
use crate::prompts::PromptedUse;

pub async fn run(args: UseArgs) -> Result<()> {
    let source = parse_install_source(&args.source);
    let registry = common::load_registry(&args.network).await;
    let mut interaction = PromptedUse {
        force: args.force,
        yes: args.yes,
    };

    output::info(&format!("Using template {}", args.source));
    let outcome = use_template(
        &source,
        &args.dir,
        args.subdir.as_deref(),
        registry.as_ref(),
        &mut interaction,
        &common::stage_options(&args.network),
    )
    .await
    .with_context(|| format!("failed to use template {}", args.source))?;

    output::report_summary(&outcome.report);
    for extension in &outcome.installed {
        let version = extension.manifest.version.as_deref().unwrap_or("-");
        output::kv(&extension.id.to_string(), version);
    }
    Ok(())
}
