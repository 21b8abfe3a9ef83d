use std::path::PathBuf;

use anyhow::Context;

use crate::cli::SweepBenchCli;
use crate::config::{App, Channel, FixedParams, SweepConfig, SweepConfigOverrides, Topology};

/// The builder for a sweep definition.
///
/// This must be used at the start of a sweep binary to define the configuration space that you
/// want to run. Dimension lists are executed in the order they are declared here.
pub struct SweepDefinitionBuilder {
    /// The name of the sweep, which should be unique within the experiment suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    cli: SweepBenchCli,
    config: SweepConfig,
    /// Replication count used when the CLI does not specify one.
    default_replications: usize,
    /// Base seed used when the CLI does not specify one.
    default_base_seed: u64,
    /// Output directory used when the CLI does not specify one.
    default_out_dir: PathBuf,
}

pub struct SweepDefinition {
    pub name: String,
    pub cli: SweepBenchCli,
    pub config: SweepConfig,
    pub replications: usize,
    pub base_seed: u64,
    pub out_dir: PathBuf,
}

impl SweepDefinitionBuilder {
    /// Initialise a new sweep definition from the sweep name and command line arguments.
    /// See [SweepDefinitionBuilder::name] for more information about the name.
    pub fn new(name: &str, cli: SweepBenchCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            config: SweepConfig {
                apps: Vec::new(),
                topologies: Vec::new(),
                channels: Vec::new(),
                fixed: FixedParams::default(),
            },
            default_replications: 1,
            default_base_seed: 12345,
            default_out_dir: PathBuf::from("results"),
        }
    }

    /// Set the values of the app dimension for this sweep.
    pub fn use_apps(mut self, apps: Vec<App>) -> Self {
        self.config.apps = apps;
        self
    }

    /// Set the values of the topology dimension for this sweep.
    pub fn use_topologies(mut self, topologies: Vec<Topology>) -> Self {
        self.config.topologies = topologies;
        self
    }

    /// Set the values of the channel dimension for this sweep.
    pub fn use_channels(mut self, channels: Vec<Channel>) -> Self {
        self.config.channels = channels;
        self
    }

    /// Set the fixed scalar parameters shared by every job in this sweep.
    pub fn use_fixed_params(mut self, fixed: FixedParams) -> Self {
        self.config.fixed = fixed;
        self
    }

    /// Set the replication count used when `--replications` is not given on the CLI.
    pub fn with_default_replications(mut self, replications: usize) -> Self {
        self.default_replications = replications;
        self
    }

    /// Set the base seed used when `--base-seed` is not given on the CLI.
    pub fn with_default_base_seed(mut self, base_seed: u64) -> Self {
        self.default_base_seed = base_seed;
        self
    }

    /// Set the output directory used when `--out-dir` is not given on the CLI.
    pub fn with_default_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.default_out_dir = out_dir.into();
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<SweepDefinition> {
        let mut config = self.config;
        if let Some(path) = &self.cli.config {
            SweepConfigOverrides::load(path)?.apply(&mut config);
        }
        config
            .validate()
            .with_context(|| format!("Invalid configuration for sweep [{}]", self.name))?;

        let replications = self.cli.replications.unwrap_or(self.default_replications);
        if replications == 0 {
            anyhow::bail!("At least one replication per configuration is required");
        }

        let base_seed = self.cli.base_seed.unwrap_or(self.default_base_seed);
        let out_dir = self.cli.out_dir.clone().unwrap_or(self.default_out_dir);

        Ok(SweepDefinition {
            name: self.name,
            cli: self.cli,
            config,
            replications,
            base_seed,
            out_dir,
        })
    }
}
