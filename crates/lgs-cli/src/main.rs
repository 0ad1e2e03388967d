use lgs_core::logging;

mod cli;
mod host;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // File logging first; fall back to stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("lgs error: {:#}", err);
        std::process::exit(1);
    }
}
