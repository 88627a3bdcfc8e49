//! king-setup CLI - build and install the King extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = match std::env::var("KING_SETUP_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ if cli.verbose => EnvFilter::new("king_setup=debug"),
        _ => EnvFilter::new("king_setup=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .map_err(|e| anyhow::anyhow!("cannot change to {}: {}", dir.display(), e))?;
    }

    match cli.command {
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::BuildExt(args) => commands::build_ext::execute(args),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Doctor(args) => commands::doctor::execute(args, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
