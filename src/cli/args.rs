use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moth", version, about = "Deterministic repository manifests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a repository and write manifest, index and validation report
    Run(RunArgs),
    /// Check the checksum and digest of a manifest
    Verify {
        /// Manifest to check (default: .moth/manifest.moth)
        manifest: Option<PathBuf>,
    },
    /// Print one entry of a manifest
    Show {
        /// Repository-relative path of the entry
        path: String,
        /// Manifest to read (default: .moth/manifest.moth)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

#[allow(clippy::struct_excessive_bools)]
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Repository root
    #[arg(default_value = ".")]
    pub root: PathBuf,
    /// Output directory (overrides `[output] dir`)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
    /// Project name for the manifest header
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,
    /// Skip the history query; churn is 0 everywhere
    #[arg(long)]
    pub no_git: bool,
    /// coverage.py JSON report
    #[arg(long, value_name = "FILE")]
    pub coverage: Option<PathBuf>,
    #[arg(long, short)]
    pub verbose: bool,
    /// Print the validation report as JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}
