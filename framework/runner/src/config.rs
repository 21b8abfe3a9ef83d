use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Workload run by the simulated nodes during a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum App {
    #[serde(rename = "pingpong")]
    PingPong,
    PoissonTraffic,
}

impl App {
    /// Stable token used in directory names and simulator flags.
    pub fn token(&self) -> &'static str {
        match self {
            App::PingPong => "pingpong",
            App::PoissonTraffic => "poisson_traffic",
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Spatial arrangement of the simulated nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    Linear,
    Ring,
    Grid,
    Star,
    Random,
    ClusterTree,
}

impl Topology {
    /// Stable token used in directory names and simulator flags.
    pub fn token(&self) -> &'static str {
        match self {
            Topology::Linear => "linear",
            Topology::Ring => "ring",
            Topology::Grid => "grid",
            Topology::Star => "star",
            Topology::Random => "random",
            Topology::ClusterTree => "cluster-tree",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Link quality profile applied by the simulator's channel model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Ideal,
    Stable,
    Lossy,
}

impl Channel {
    /// Stable token used in directory names and simulator flags.
    pub fn token(&self) -> &'static str {
        match self {
            Channel::Ideal => "ideal",
            Channel::Stable => "stable",
            Channel::Lossy => "lossy",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Shape of a hierarchical cluster-tree topology.
///
/// Only consumed when [Topology::ClusterTree] is part of the sweep; the simulator receives these
/// as dedicated flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterTreeParams {
    /// Depth of the cluster tree
    pub tree_depth: u32,
    /// Clusters spawned per tree level
    pub clusters_per_level: u32,
    /// Nodes placed in each cluster
    pub nodes_per_cluster: u32,
    /// Placement radius for cluster centres, in metres
    pub cluster_radius: f64,
    /// Placement radius for nodes around their cluster centre, in metres
    pub node_radius: f64,
}

/// Scalar parameters shared by every job in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedParams {
    /// Number of nodes in the simulated network
    pub num_nodes: u32,
    /// Total simulated duration, in seconds
    pub sim_time: f64,
    /// Delay before workload traffic starts, in seconds
    pub app_delay: f64,
    /// Mean inter-arrival time for stochastic-traffic workloads, in seconds
    pub mean_interarrival: f64,
    /// Resolution of the spatial discretisation grid, in metres
    pub dspace_step: f64,
    /// Transmission power in dBm, when the sweep pins one
    pub tx_power: Option<f64>,
    /// Cluster-tree shape parameters, required when the topology dimension includes
    /// [Topology::ClusterTree]
    pub cluster_tree: Option<ClusterTreeParams>,
}

impl Default for FixedParams {
    fn default() -> Self {
        Self {
            num_nodes: 20,
            sim_time: 1800.0,
            app_delay: 130.0,
            mean_interarrival: 30.0,
            dspace_step: 1.0,
            tx_power: Some(10.0),
            cluster_tree: None,
        }
    }
}

/// The configuration space for one sweep: ordered dimension value lists plus the fixed scalar
/// parameters shared by every job.
///
/// Dimension lists iterate in declaration order. They are never sorted, so the order in which a
/// sweep declares its values is the order in which configurations run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub apps: Vec<App>,
    pub topologies: Vec<Topology>,
    pub channels: Vec<Channel>,
    pub fixed: FixedParams,
}

impl SweepConfig {
    /// Check that every dimension is usable: non-empty and free of duplicates.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_dimension("apps", &self.apps)?;
        validate_dimension("topologies", &self.topologies)?;
        validate_dimension("channels", &self.channels)?;

        if self.topologies.contains(&Topology::ClusterTree) && self.fixed.cluster_tree.is_none() {
            anyhow::bail!(
                "The topologies dimension includes cluster-tree but no cluster-tree shape parameters are set"
            );
        }

        Ok(())
    }

    /// The number of configurations in the Cartesian product of the dimensions.
    pub fn configuration_count(&self) -> usize {
        self.apps.len() * self.topologies.len() * self.channels.len()
    }
}

fn validate_dimension<T: PartialEq + fmt::Debug>(name: &str, values: &[T]) -> anyhow::Result<()> {
    if values.is_empty() {
        anyhow::bail!("Dimension [{name}] must not be empty");
    }

    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            anyhow::bail!("Dimension [{name}] contains duplicate value {value:?}");
        }
    }

    Ok(())
}

/// Optional TOML overrides applied on top of a sweep's built-in configuration.
///
/// Any dimension list or fixed parameter left out of the file keeps the sweep's value:
///
/// ```toml
/// [dimensions]
/// topologies = ["random", "grid"]
/// channels = ["stable", "lossy"]
///
/// [fixed]
/// num_nodes = 50
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfigOverrides {
    #[serde(default)]
    dimensions: DimensionOverrides,
    #[serde(default)]
    fixed: FixedParamsOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DimensionOverrides {
    apps: Option<Vec<App>>,
    topologies: Option<Vec<Topology>>,
    channels: Option<Vec<Channel>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedParamsOverrides {
    num_nodes: Option<u32>,
    sim_time: Option<f64>,
    app_delay: Option<f64>,
    mean_interarrival: Option<f64>,
    dspace_step: Option<f64>,
    tx_power: Option<f64>,
    cluster_tree: Option<ClusterTreeParams>,
}

impl SweepConfigOverrides {
    /// Load overrides from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read sweep config from {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Could not parse sweep config at {}", path.display()))
    }

    /// Apply the overrides to a sweep configuration, field by field.
    pub fn apply(self, config: &mut SweepConfig) {
        if let Some(apps) = self.dimensions.apps {
            config.apps = apps;
        }
        if let Some(topologies) = self.dimensions.topologies {
            config.topologies = topologies;
        }
        if let Some(channels) = self.dimensions.channels {
            config.channels = channels;
        }

        let fixed = self.fixed;
        if let Some(num_nodes) = fixed.num_nodes {
            config.fixed.num_nodes = num_nodes;
        }
        if let Some(sim_time) = fixed.sim_time {
            config.fixed.sim_time = sim_time;
        }
        if let Some(app_delay) = fixed.app_delay {
            config.fixed.app_delay = app_delay;
        }
        if let Some(mean_interarrival) = fixed.mean_interarrival {
            config.fixed.mean_interarrival = mean_interarrival;
        }
        if let Some(dspace_step) = fixed.dspace_step {
            config.fixed.dspace_step = dspace_step;
        }
        if let Some(tx_power) = fixed.tx_power {
            config.fixed.tx_power = Some(tx_power);
        }
        if let Some(cluster_tree) = fixed.cluster_tree {
            config.fixed.cluster_tree = Some(cluster_tree);
        }
    }
}
