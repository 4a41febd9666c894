//! Brand install command

use anyhow::{Context, Result};
use quartex_core::types::source::parse_install_source;
use quartex_install::use_brand;

use super::common;
use crate::cli::BrandArgs;
use crate::output;
use crate::prompts;

pub async fn run(args: BrandArgs) -> Result<()> {
    let source = parse_install_source(&args.source);
    let registry = common::load_registry(&args.network).await;
    let mut policy = prompts::conflict_policy(args.force, false);
    let mut confirm = prompts::cleanup_prompt(args.clean);

    output::info(&format!("Installing brand from {}", args.source));
    let report = use_brand(
        &source,
        &args.dir,
        registry.as_ref(),
        policy.as_mut(),
        Some(&mut confirm),
        &common::stage_options(&args.network),
    )
    .await
    .with_context(|| format!("failed to install brand from {}", args.source))?;

    output::report_summary(&report);
    Ok(())
}
