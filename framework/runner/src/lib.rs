mod cli;
mod config;
mod definition;
mod executor;
mod init;
mod plan;
mod progress;
mod run;
mod types;

pub mod prelude {
    pub use crate::cli::SweepBenchCli;
    pub use crate::config::{
        App, Channel, ClusterTreeParams, FixedParams, SweepConfig, SweepConfigOverrides, Topology,
    };
    pub use crate::definition::{SweepDefinition, SweepDefinitionBuilder};
    pub use crate::executor::{JobOutcome, JobRunner, JobStatus};
    pub use crate::init::init;
    pub use crate::plan::{BatchRun, JobSpec};
    pub use crate::run::{run, SweepProgress, SweepReport};
    pub use crate::types::SweepBenchResult;
}
