use std::process::Command;

use anyhow::Context;

use sweep_bench_runner::prelude::{JobRunner, JobSpec, JobStatus, SweepBenchResult, Topology};

use crate::simulator_env::SimulatorEnv;

/// Module invoked on the interpreter for every job. It resolves against the source root the
/// runner exports on `PYTHONPATH`.
const SIMULATION_MODULE: &str = "experiments.run_simulation";

/// Executes sweep jobs against the external network simulator.
///
/// Each job is one synchronous interpreter invocation. The process exit status is the only
/// success signal and the contents of the job's output directory are never inspected.
#[derive(Debug, Clone)]
pub struct NetsimRunner {
    env: SimulatorEnv,
}

impl NetsimRunner {
    pub fn new(env: SimulatorEnv) -> Self {
        Self { env }
    }

    /// Resolve the simulator environment and build a runner, failing before any job runs if the
    /// environment is unusable.
    pub fn from_environment() -> SweepBenchResult<Self> {
        Ok(Self::new(SimulatorEnv::resolve()?))
    }

    fn job_command(&self, job: &JobSpec) -> Command {
        let mut cmd = Command::new(self.env.interpreter());

        cmd.env("PYTHONPATH", self.env.python_path())
            .arg("-m")
            .arg(SIMULATION_MODULE)
            .arg("--app")
            .arg(job.app.token())
            .arg("--topology")
            .arg(job.topology.token())
            .arg("--channel")
            .arg(job.channel.token())
            .arg("--num_nodes")
            .arg(job.fixed.num_nodes.to_string())
            .arg("--sim_time")
            .arg(job.fixed.sim_time.to_string())
            .arg("--sim_seed")
            .arg(job.seed.to_string())
            .arg("--app_delay")
            .arg(job.fixed.app_delay.to_string())
            .arg("--mean_interarrival")
            .arg(job.fixed.mean_interarrival.to_string())
            .arg("--dspace_step")
            .arg(job.fixed.dspace_step.to_string())
            .arg("--out_dir")
            .arg(&job.out_dir);

        if let Some(tx_power) = job.fixed.tx_power {
            cmd.arg("--tx_power").arg(tx_power.to_string());
        }

        // Shape flags only apply to the hierarchical topology; the definition has already been
        // validated to carry them when cluster-tree is swept.
        if job.topology == Topology::ClusterTree {
            if let Some(shape) = &job.fixed.cluster_tree {
                cmd.arg("--tree_depth")
                    .arg(shape.tree_depth.to_string())
                    .arg("--clusters_per_level")
                    .arg(shape.clusters_per_level.to_string())
                    .arg("--nodes_per_cluster")
                    .arg(shape.nodes_per_cluster.to_string())
                    .arg("--cluster_radius")
                    .arg(shape.cluster_radius.to_string())
                    .arg("--node_radius")
                    .arg(shape.node_radius.to_string());
            }
        }

        cmd
    }
}

impl JobRunner for NetsimRunner {
    fn execute(&self, job: &JobSpec) -> anyhow::Result<JobStatus> {
        let mut cmd = self.job_command(job);
        log::debug!("Running simulator: {cmd:?}");

        let status = cmd.status().with_context(|| {
            format!(
                "Failed to start the simulator for configuration [{}]",
                job.configuration_label()
            )
        })?;

        if status.success() {
            Ok(JobStatus::Success)
        } else {
            Ok(JobStatus::Failed(status.code()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sweep_bench_runner::prelude::{App, Channel, ClusterTreeParams, FixedParams};
    use tempfile::TempDir;

    use super::*;

    fn sample_runner() -> (NetsimRunner, TempDir) {
        let root = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir(root.path().join("src")).unwrap();
        let venv = root.path().join("venv");
        std::fs::create_dir_all(venv.join("bin")).unwrap();
        std::fs::write(venv.join("bin").join("python"), "").unwrap();

        let env = SimulatorEnv::resolve_from(root.path().into(), Some(venv)).unwrap();
        (NetsimRunner::new(env), root)
    }

    fn sample_job(topology: Topology) -> JobSpec {
        JobSpec {
            app: App::PoissonTraffic,
            topology,
            channel: Channel::Stable,
            fixed: FixedParams {
                cluster_tree: Some(ClusterTreeParams {
                    tree_depth: 2,
                    clusters_per_level: 3,
                    nodes_per_cluster: 6,
                    cluster_radius: 100.0,
                    node_radius: 30.0,
                }),
                ..FixedParams::default()
            },
            replication: 1,
            seed: 12346,
            out_dir: PathBuf::from("results/batch_test/poisson_traffic/random_stable_20nodes"),
        }
    }

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn flag_value(args: &[String], flag: &str) -> String {
        let position = args
            .iter()
            .position(|arg| arg == flag)
            .unwrap_or_else(|| panic!("flag {flag} not passed"));
        args[position + 1].clone()
    }

    #[test]
    fn passes_the_job_parameters_as_simulator_flags() {
        let (runner, _root) = sample_runner();
        let cmd = runner.job_command(&sample_job(Topology::Random));
        let args = args_of(&cmd);

        assert_eq!(vec!["-m", SIMULATION_MODULE], args[..2].to_vec());
        assert_eq!("poisson_traffic", flag_value(&args, "--app"));
        assert_eq!("random", flag_value(&args, "--topology"));
        assert_eq!("stable", flag_value(&args, "--channel"));
        assert_eq!("20", flag_value(&args, "--num_nodes"));
        assert_eq!("1800", flag_value(&args, "--sim_time"));
        assert_eq!("12346", flag_value(&args, "--sim_seed"));
        assert_eq!("130", flag_value(&args, "--app_delay"));
        assert_eq!("30", flag_value(&args, "--mean_interarrival"));
        assert_eq!("1", flag_value(&args, "--dspace_step"));
        assert_eq!("10", flag_value(&args, "--tx_power"));
        assert_eq!(
            "results/batch_test/poisson_traffic/random_stable_20nodes",
            flag_value(&args, "--out_dir")
        );
    }

    #[test]
    fn shape_flags_are_only_passed_for_cluster_tree_topologies() {
        let (runner, _root) = sample_runner();

        let args = args_of(&runner.job_command(&sample_job(Topology::Random)));
        assert!(!args.iter().any(|arg| arg == "--tree_depth"));

        let args = args_of(&runner.job_command(&sample_job(Topology::ClusterTree)));
        assert_eq!("2", flag_value(&args, "--tree_depth"));
        assert_eq!("3", flag_value(&args, "--clusters_per_level"));
        assert_eq!("6", flag_value(&args, "--nodes_per_cluster"));
        assert_eq!("100", flag_value(&args, "--cluster_radius"));
        assert_eq!("30", flag_value(&args, "--node_radius"));
    }

    #[test]
    fn the_source_root_is_exported_on_pythonpath() {
        let (runner, root) = sample_runner();
        let cmd = runner.job_command(&sample_job(Topology::Random));

        let python_path = cmd
            .get_envs()
            .find(|(key, _)| *key == "PYTHONPATH")
            .and_then(|(_, value)| value)
            .expect("PYTHONPATH not set for the child process");

        assert!(
            python_path
                .to_string_lossy()
                .starts_with(&*root.path().join("src").to_string_lossy())
        );
    }
}
