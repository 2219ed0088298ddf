//! retro-curate CLI
//!
//! Picks one dump per game from ROM sets and keeps a destination directory in
//! sync with the selection.

mod cli_types;
mod commands;
mod error;
mod logger;
mod progress;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;

use cli_types::Cli;
use error::CliError;
use logger::CliLogger;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
                _ => error::EXIT_USAGE,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(&cli) {
        log::error!("{e}");
        log::logger().flush();
        std::process::exit(e.exit_code());
    }
    log::logger().flush();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let logger = match CliLogger::new(cli.verbosity, cli.quiet, cli.log_file.as_deref()) {
        Ok(logger) => logger,
        Err(e) => {
            // no logger yet to report through
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    };
    logger::init(logger)?;
    commands::run(cli)
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
