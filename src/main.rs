use std::process::ExitCode;

use clap::Parser;
use plainqr::logging;

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is best effort, scanning works without it
    match cli.log_target() {
        Ok(target) => {
            if let Err(err) = logging::init(target) {
                eprintln!("plainqr: logging disabled: {err:#}");
            }
        }
        Err(err) => eprintln!("plainqr: logging disabled: {err:#}"),
    }

    match cli.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("plainqr error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
