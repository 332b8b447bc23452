//! Command dispatch, kept out of the binary.

use super::{
    args::Commands,
    handlers::{handle_run, handle_show, handle_verify},
};
use crate::exit::MothExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands) -> Result<MothExit> {
    match command {
        Commands::Run(args) => handle_run(&args),
        Commands::Verify { manifest } => handle_verify(manifest.as_deref()),
        Commands::Show { path, manifest } => handle_show(&path, manifest.as_deref()),
    }
}
