//! drydock CLI - verify, build and publish npm packages

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
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("drydock=debug")
    } else {
        EnvFilter::new("drydock=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .init();

    let color = !cli.no_color;

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::Deploy(args) => commands::deploy::execute(args, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
