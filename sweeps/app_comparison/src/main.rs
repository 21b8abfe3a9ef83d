use netsim_sweep_bench_runner::prelude::*;

/// Full matrix over workloads, topologies and channels with short runs, used to compare the two
/// applications under every network condition before committing to a long batch.
fn main() -> SweepBenchResult<()> {
    let cli = init();

    let sweep = SweepDefinitionBuilder::new(env!("CARGO_PKG_NAME"), cli)
        .use_apps(vec![App::PingPong, App::PoissonTraffic])
        .use_topologies(vec![
            Topology::Linear,
            Topology::Ring,
            Topology::Grid,
            Topology::Star,
            Topology::Random,
            Topology::ClusterTree,
        ])
        .use_channels(vec![Channel::Ideal, Channel::Stable, Channel::Lossy])
        .use_fixed_params(FixedParams {
            num_nodes: 20,
            sim_time: 300.0,
            app_delay: 60.0,
            mean_interarrival: 60.0,
            dspace_step: 1.0,
            tx_power: Some(0.0),
            cluster_tree: Some(ClusterTreeParams {
                tree_depth: 2,
                clusters_per_level: 3,
                nodes_per_cluster: 6,
                cluster_radius: 100.0,
                node_radius: 30.0,
            }),
        })
        .with_default_replications(10)
        .with_default_base_seed(123);

    let runner = NetsimRunner::from_environment()?;
    let report = run(sweep, &runner)?;

    log::info!(
        "Completed {} of {} jobs",
        report.completed_jobs,
        report.total_jobs
    );

    Ok(())
}
