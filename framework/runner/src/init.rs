use crate::cli::SweepBenchCli;
use clap::Parser;

/// Initialise the CLI and logging for the sweep bench runner.
pub fn init() -> SweepBenchCli {
    env_logger::init();

    SweepBenchCli::parse()
}
