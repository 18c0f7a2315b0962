pub mod assemble;
pub mod inspect;
pub mod mutate;
pub mod segment;

use crate::utils::progress::CliProgressHandler;

fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}
