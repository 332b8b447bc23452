use clap::Parser;
use colored::Colorize;
use moth_core::cli::{self, Cli};
use moth_core::exit::MothExit;

fn main() -> MothExit {
    let cli = Cli::parse();

    let result = if let Some(cmd) = cli.command {
        cli::dispatch::execute(cmd)
    } else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        Ok(MothExit::Success)
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            MothExit::Error
        }
    }
}
