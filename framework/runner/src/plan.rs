use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use itertools::iproduct;

use sweep_bench_core::prelude::SeedSequence;

use crate::config::{App, Channel, FixedParams, SweepConfig, Topology};
use crate::definition::SweepDefinition;

/// One concrete (configuration, replication) unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub app: App,
    pub topology: Topology,
    pub channel: Channel,
    pub fixed: FixedParams,
    /// Replication index within the configuration, `0..replications`
    pub replication: usize,
    /// Seed for this replication, `base_seed + replication`
    pub seed: u64,
    /// Directory the simulator persists its artifacts into. The runner guarantees it exists
    /// before the job starts and never interprets its contents.
    pub out_dir: PathBuf,
}

impl JobSpec {
    /// Human-readable identifier of the configuration this job belongs to, used in logs and
    /// failure diagnostics. Matches the configuration's directory below the batch root.
    pub fn configuration_label(&self) -> String {
        format!(
            "{}/{}_{}_{}nodes",
            self.app, self.topology, self.channel, self.fixed.num_nodes
        )
    }
}

/// The whole enumerated sweep: one timestamped batch root plus the ordered job list.
#[derive(Debug, Clone)]
pub struct BatchRun {
    /// The timestamped top-level output directory for this sweep. The stamp is taken once, when
    /// the sweep is enumerated, and shared by every job.
    pub batch_root: PathBuf,
    /// The time the sweep was enumerated
    pub started_at: DateTime<Local>,
    /// Jobs in execution order
    pub jobs: Vec<JobSpec>,
    /// Number of configurations in the sweep
    pub configuration_count: usize,
    /// Replications per configuration
    pub replications: usize,
}

impl BatchRun {
    /// Enumerate the ordered job list for a sweep definition.
    ///
    /// Iteration nests in declaration order: apps outermost, then topologies, then channels, with
    /// the replication index innermost. Every configuration replays the identical seed sequence
    /// `base_seed..base_seed + replications`.
    pub fn enumerate(definition: &SweepDefinition) -> Self {
        let started_at = Local::now();
        let batch_root = definition
            .out_dir
            .join(format!("batch_{}", started_at.format("%Y-%m-%d_%H-%M-%S")));

        let seeds = SeedSequence::new(definition.base_seed, definition.replications);
        let jobs = enumerate_jobs(&definition.config, seeds, &batch_root);

        Self {
            batch_root,
            started_at,
            jobs,
            configuration_count: definition.config.configuration_count(),
            replications: definition.replications,
        }
    }

    pub fn total_jobs(&self) -> usize {
        self.jobs.len()
    }
}

fn enumerate_jobs(config: &SweepConfig, seeds: SeedSequence, batch_root: &Path) -> Vec<JobSpec> {
    let mut jobs = Vec::with_capacity(config.configuration_count() * seeds.len());

    for (app, topology, channel) in iproduct!(&config.apps, &config.topologies, &config.channels) {
        let out_dir = batch_root.join(app.token()).join(format!(
            "{}_{}_{}nodes",
            topology.token(),
            channel.token(),
            config.fixed.num_nodes
        ));

        for (replication, seed) in seeds.iter().enumerate() {
            jobs.push(JobSpec {
                app: *app,
                topology: *topology,
                channel: *channel,
                fixed: config.fixed.clone(),
                replication,
                seed,
                out_dir: out_dir.clone(),
            });
        }
    }

    jobs
}
