use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct SweepBenchCli {
    /// The number of replications (Monte Carlo runs) per configuration
    #[clap(short = 'n', long)]
    pub replications: Option<usize>,

    /// Starting seed for the replications of each configuration.
    ///
    /// Replication `i` of every configuration runs with seed `base_seed + i`. The same seed
    /// sequence is deliberately replayed for every configuration so that replications with the
    /// same index are directly comparable across configurations.
    #[clap(long)]
    pub base_seed: Option<u64>,

    /// Directory under which the timestamped batch root is created
    #[clap(long)]
    pub out_dir: Option<PathBuf>,

    /// Path to a TOML file overriding the sweep's dimension lists and fixed parameters
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Print the enumerated job list without executing anything
    #[clap(long, default_value = "false")]
    pub dry_run: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}
