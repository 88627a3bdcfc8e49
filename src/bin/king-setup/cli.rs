//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Build and install the King Cython extension against the native king library
#[derive(Parser)]
#[command(name = "king-setup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the include dirs, library dirs and libraries resolved through pkg-config
    Flags(FlagsArgs),

    /// Generate, compile and link the extension module
    BuildExt(BuildExtArgs),

    /// Build, then install the module and the header files
    Install(InstallArgs),

    /// Remove build outputs
    Clean(CleanArgs),

    /// Check the external tools the build needs
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Print the option set as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildExtArgs {
    /// Copy the built module into the project directory
    #[arg(short, long)]
    pub inplace: bool,

    /// Rebuild everything, ignoring fingerprints
    #[arg(short, long)]
    pub force: bool,

    /// Emit the build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Stage the installation below this directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Prefix for relative data-file destinations
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Directory for the extension module
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// Show what would be installed
    #[arg(long)]
    pub dry_run: bool,

    /// Rebuild everything, ignoring fingerprints
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the module copied by `build-ext --inplace`
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DoctorArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
