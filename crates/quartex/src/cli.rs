//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Quartex - Quarto extension manager
#[derive(Parser, Debug)]
#[command(name = "quartex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install extensions from a GitHub repo, URL, or local path
    Install(InstallArgs),

    /// Copy a project template, then install its bundled extensions
    Use(UseArgs),

    /// Install a brand (colors, logos, fonts) into the project
    Brand(BrandArgs),

    /// List installed extensions
    List(ListArgs),

    /// Check installed extensions for available updates
    Check(CheckArgs),

    /// Update installed extensions
    Update(UpdateArgs),

    /// Show details for one installed extension
    Info(InfoArgs),
}

/// Options shared by every command that touches the registry or network
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Registry repository (owner/repo)
    #[arg(long, env = "QUARTEX_REGISTRY_REPO")]
    pub registry_repo: Option<String>,

    /// Directory for the registry cache
    #[arg(long, env = "QUARTEX_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Extension source: owner/repo[@version], an archive URL, or a local path
    pub source: String,

    /// Project directory to install into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files without prompting
    #[arg(short, long)]
    pub force: bool,

    /// Answer every prompt with its default
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct UseArgs {
    /// Template source: owner/repo[@version], an archive URL, or a local path
    pub source: String,

    /// Project directory to copy into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Subdirectory under the project to receive the template files
    #[arg(long)]
    pub subdir: Option<PathBuf>,

    /// Take every file and overwrite without prompting
    #[arg(short, long)]
    pub force: bool,

    /// Skip prompts, taking every file but overwriting nothing
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct BrandArgs {
    /// Brand source: owner/repo[@version], an archive URL, or a local path
    pub source: String,

    /// Project directory to install into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files without prompting
    #[arg(short, long)]
    pub force: bool,

    /// Delete stale files under _brand without prompting
    #[arg(long)]
    pub clean: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Extensions to update (owner/name or name); all outdated when empty
    pub extensions: Vec<String>,

    /// Project directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Extension id (owner/name or name)
    pub extension: String,

    /// Project directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}
