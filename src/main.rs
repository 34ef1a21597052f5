use std::process::ExitCode;

use structql::cli::CommandLineInterface;
use structql::logging;

fn main() -> ExitCode {
    let command_line_interface = CommandLineInterface::load();
    if let Err(error) = logging::init_tracing(command_line_interface.log_level) {
        eprintln!("{error:#}");
        return ExitCode::FAILURE;
    }
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
