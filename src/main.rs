use std::process::ExitCode;

use productive_digest::cli::commands;
use productive_digest::utils::init_logging;

fn main() -> ExitCode {
    init_logging("warn");

    match commands::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
