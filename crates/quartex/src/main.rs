//! Quartex CLI - Quarto extension manager
//!
//! This is the main entry point for the quartex command-line interface.

mod cli;
mod commands;
mod output;
mod prompts;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Install(args) => commands::install::run(args).await,
        Commands::Use(args) => commands::use_template::run(args).await,
        Commands::Brand(args) => commands::brand::run(args).await,
        Commands::List(args) => commands::list::run(args),
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Update(args) => commands::update::run(args).await,
        Commands::Info(args) => commands::info::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
