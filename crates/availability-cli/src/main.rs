//! availability - publish tutor availability and find free tutors

use std::process::ExitCode;

mod cli;
mod logging;

fn main() -> ExitCode {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
