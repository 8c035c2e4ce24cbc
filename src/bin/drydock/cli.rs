//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// drydock - verify, build and publish npm packages
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate package.json and optionally the version bump
    Check(CheckArgs),

    /// Run the deploy pipeline
    Deploy(DeployArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Path to package.json
    #[arg(long, default_value = "package.json")]
    pub manifest: PathBuf,

    /// Latest version on the registry to compare against
    #[arg(long)]
    pub registry_version: Option<String>,
}

#[derive(Args)]
pub struct DeployArgs {
    /// Path to package.json
    #[arg(long, default_value = "package.json")]
    pub manifest: PathBuf,

    /// Skip a step, by number (1-7) or name (e.g. `lint`)
    #[arg(long = "skip", value_name = "STEP")]
    pub skip: Vec<String>,

    /// Run every step except publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Latest version on the registry; omit for a first publish
    #[arg(long)]
    pub registry_version: Option<String>,

    /// Directory the build writes compiled output to
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Directory to stage the publishable tree in
    #[arg(long)]
    pub publish_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
