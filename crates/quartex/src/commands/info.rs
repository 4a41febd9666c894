//! Show details for one installed extension

use anyhow::{anyhow, Context, Result};
use quartex_core::types::parse_extension_id;
use quartex_discovery::scan_project;
use quartex_metadata::{SchemaCache, SnippetCache};

use crate::cli::InfoArgs;
use crate::output;

pub fn run(args: InfoArgs) -> Result<()> {
    let wanted = parse_extension_id(&args.extension)?;
    let installed = scan_project(&args.dir)
        .with_context(|| format!("failed to scan {}", args.dir.display()))?;

    // An unowned query like `lightbox` also matches `quarto-ext/lightbox`
    let extension = installed
        .iter()
        .find(|e| e.id == wanted)
        .or_else(|| {
            installed
                .iter()
                .find(|e| wanted.owner.is_none() && e.id.name == wanted.name)
        })
        .ok_or_else(|| anyhow!("extension {} is not installed", args.extension))?;

    output::kv("id", &extension.id.to_string());
    if let Some(title) = &extension.manifest.title {
        output::kv("title", title);
    }
    if let Some(author) = &extension.manifest.author {
        output::kv("author", author);
    }
    if let Some(version) = &extension.manifest.version {
        output::kv("version", version);
    }
    if let Some(source) = &extension.manifest.source {
        output::kv("source", source);
    }
    if let Some(required) = &extension.manifest.quarto_required {
        output::kv("quarto required", required);
    }
    if let Some(contributes) = &extension.manifest.contributes {
        output::kv("contributes", &contributes.kinds().join(", "));
    }
    output::kv("directory", &extension.directory.display().to_string());

    let mut schemas = SchemaCache::default();
    let counts = schemas.get(&extension.directory).map(|schema| {
        (
            schema.options.as_ref().map(|o| o.len()).unwrap_or(0),
            schema.shortcodes.as_ref().map(|s| s.len()).unwrap_or(0),
        )
    });
    match counts {
        Some((options, shortcodes)) => output::kv(
            "schema",
            &format!("{options} option(s), {shortcodes} shortcode(s)"),
        ),
        None => {
            if let Some(error) = schemas.get_error(&extension.directory) {
                output::warning(&format!("schema unreadable: {error}"));
            }
        }
    }

    let mut snippets = SnippetCache::default();
    if let Some(collection) = snippets.get(&extension.directory) {
        output::kv("snippets", &collection.len().to_string());
    }

    Ok(())
}
