use netsim_sweep_bench_runner::prelude::*;

/// Monte Carlo batch for the Poisson traffic workload: every replication of every
/// topology/channel combination runs the same seed sequence, so per-seed results can be compared
/// across configurations.
fn main() -> SweepBenchResult<()> {
    let cli = init();

    let sweep = SweepDefinitionBuilder::new(env!("CARGO_PKG_NAME"), cli)
        .use_apps(vec![App::PoissonTraffic])
        .use_topologies(vec![Topology::Random])
        .use_channels(vec![Channel::Stable])
        .use_fixed_params(FixedParams {
            num_nodes: 20,
            sim_time: 1800.0,
            app_delay: 130.0,
            mean_interarrival: 30.0,
            dspace_step: 1.0,
            tx_power: Some(10.0),
            cluster_tree: None,
        })
        .with_default_replications(100)
        .with_default_base_seed(12345);

    let runner = NetsimRunner::from_environment()?;
    let report = run(sweep, &runner)?;

    log::info!(
        "Completed {} of {} jobs",
        report.completed_jobs,
        report.total_jobs
    );

    Ok(())
}
