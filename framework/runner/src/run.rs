use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use sweep_bench_core::prelude::{
    DelegatedInterruptListener, InterruptHandle, SweepInterruptedError,
};
use sweep_bench_summary_model::{append_batch_summary, BatchSummary};

use crate::definition::SweepDefinitionBuilder;
use crate::executor::{JobOutcome, JobRunner, JobStatus};
use crate::plan::{BatchRun, JobSpec};
use crate::progress::job_progress_bar;

/// Progress accounting threaded through the job loop.
///
/// The indices are 1-based for reporting. `completed` counts the jobs that finished successfully
/// across the whole sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepProgress {
    pub configuration_index: usize,
    pub configuration_count: usize,
    pub replication_index: usize,
    pub replications: usize,
    pub completed: usize,
}

/// Report for a sweep that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub batch_root: PathBuf,
    pub total_jobs: usize,
    pub completed_jobs: usize,
}

/// Run every job of the sweep, strictly one at a time, aborting the whole sweep on the first
/// failure.
///
/// Jobs run in enumeration order: apps, then topologies, then channels as declared, with the
/// replication index innermost. Partial results are left on disk when the sweep aborts; the
/// returned error names the failing configuration and seed.
pub fn run(definition: SweepDefinitionBuilder, runner: &dyn JobRunner) -> anyhow::Result<SweepReport> {
    let definition = definition.build()?;

    log::info!("Running sweep: {}", definition.name);

    let batch = BatchRun::enumerate(&definition);

    log::info!("Configurations: {}", batch.configuration_count);
    log::info!("Replications per configuration: {}", batch.replications);
    log::info!("Total jobs: {}", batch.total_jobs());
    log::info!("Base seed: {}", definition.base_seed);
    log::info!("Batch root: {}", batch.batch_root.display());

    if definition.cli.dry_run {
        for job in &batch.jobs {
            println!(
                "{} seed={} -> {}",
                job.configuration_label(),
                job.seed,
                job.out_dir.display()
            );
        }
        return Ok(SweepReport {
            batch_root: batch.batch_root,
            total_jobs: batch.jobs.len(),
            completed_jobs: 0,
        });
    }

    fs::create_dir_all(&batch.batch_root).with_context(|| {
        format!("Failed to create batch root {}", batch.batch_root.display())
    })?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let interrupt_listener = start_interrupt_listener(&runtime);

    let progress = run_jobs(
        &batch,
        runner,
        interrupt_listener,
        definition.cli.no_progress,
    )?;

    let mut summary = BatchSummary::new(
        definition.name.clone(),
        batch.batch_root.display().to_string(),
        batch.started_at.timestamp(),
        batch.configuration_count,
        batch.replications,
        definition.base_seed,
    );
    summary.set_completed_jobs(progress.completed);
    if let Err(e) = append_batch_summary(summary, batch.batch_root.join("batch_summary.jsonl")) {
        // The sweep itself succeeded at this point, so a summary problem is only logged.
        log::error!("Failed to append batch summary: {e:?}");
    }

    log::info!(
        "Sweep complete: {} jobs run, results in {}",
        progress.completed,
        batch.batch_root.display()
    );

    Ok(SweepReport {
        batch_root: batch.batch_root.clone(),
        total_jobs: batch.total_jobs(),
        completed_jobs: progress.completed,
    })
}

fn start_interrupt_listener(runtime: &tokio::runtime::Runtime) -> DelegatedInterruptListener {
    let handle = InterruptHandle::default();

    let listener = handle.new_listener();
    runtime.spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to receive Ctrl-C signal");
        handle.interrupt();
        println!("Received interrupt, stopping at the next job boundary...");
    });

    listener
}

fn run_jobs(
    batch: &BatchRun,
    runner: &dyn JobRunner,
    mut interrupt_listener: DelegatedInterruptListener,
    no_progress: bool,
) -> anyhow::Result<SweepProgress> {
    let progress_bar = (!no_progress).then(|| job_progress_bar(batch.total_jobs()));

    let mut progress = SweepProgress {
        configuration_count: batch.configuration_count,
        replications: batch.replications,
        ..Default::default()
    };

    for (job_index, job) in batch.jobs.iter().enumerate() {
        progress.configuration_index = job_index / batch.replications + 1;
        progress.replication_index = job.replication + 1;

        if interrupt_listener.should_stop() {
            if let Some(pb) = &progress_bar {
                pb.abandon();
            }
            log::warn!(
                "Interrupt received, stopping before job {} of {}",
                job_index + 1,
                batch.total_jobs()
            );
            return Err(anyhow::anyhow!(SweepInterruptedError::default()));
        }

        fs::create_dir_all(&job.out_dir).with_context(|| {
            format!("Failed to create output directory {}", job.out_dir.display())
        })?;

        log::info!(
            "Configuration {}/{} [{}], replication {}/{} (seed {})",
            progress.configuration_index,
            progress.configuration_count,
            job.configuration_label(),
            progress.replication_index,
            progress.replications,
            job.seed
        );

        let outcome = JobOutcome {
            status: runner.execute(job).with_context(|| {
                format!(
                    "Failed to execute job for configuration [{}] with seed {}",
                    job.configuration_label(),
                    job.seed
                )
            })?,
            out_dir: job.out_dir.clone(),
        };

        match outcome.status {
            JobStatus::Success => {
                progress.completed += 1;
                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
            }
            JobStatus::Failed(exit_code) => {
                if let Some(pb) = &progress_bar {
                    pb.abandon();
                }
                write_failure_report(&batch.batch_root, job, exit_code, &progress);
                anyhow::bail!(
                    "Job failed for configuration [{}] with seed {} ({}); aborting the sweep after {} completed jobs",
                    job.configuration_label(),
                    job.seed,
                    exit_code_label(exit_code),
                    progress.completed
                );
            }
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish();
    }

    Ok(progress)
}

fn exit_code_label(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Record the failing job in the batch root so the partial results on disk carry their own
/// diagnosis. Best effort: a report problem must not mask the job failure itself.
fn write_failure_report(
    batch_root: &Path,
    job: &JobSpec,
    exit_code: Option<i32>,
    progress: &SweepProgress,
) {
    let path = batch_root.join("failed_job.txt");
    let write = || -> anyhow::Result<()> {
        let mut file = fs::File::create(&path)?;
        writeln!(file, "Failure report for batch {}", batch_root.display())?;
        writeln!(file, "configuration: {}", job.configuration_label())?;
        writeln!(
            file,
            "replication: {} of {}",
            progress.replication_index, progress.replications
        )?;
        writeln!(file, "seed: {}", job.seed)?;
        writeln!(file, "status: {}", exit_code_label(exit_code))?;
        writeln!(file, "completed jobs before failure: {}", progress.completed)?;
        Ok(())
    };

    if let Err(e) = write() {
        log::error!("Failed to write failure report to {}: {e:?}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Local;

    use crate::config::{App, Channel, FixedParams, SweepConfig, Topology};

    use super::*;

    #[derive(Debug, Default)]
    struct CountingRunner {
        invocations: Mutex<usize>,
    }

    impl JobRunner for CountingRunner {
        fn execute(&self, _job: &JobSpec) -> anyhow::Result<JobStatus> {
            *self.invocations.lock().unwrap() += 1;
            Ok(JobStatus::Success)
        }
    }

    fn sample_batch(batch_root: PathBuf) -> BatchRun {
        let config = SweepConfig {
            apps: vec![App::PoissonTraffic],
            topologies: vec![Topology::Random],
            channels: vec![Channel::Stable],
            fixed: FixedParams::default(),
        };
        let out_dir = batch_root.join("poisson_traffic").join("random_stable_20nodes");
        let jobs = (0..3)
            .map(|replication| JobSpec {
                app: config.apps[0],
                topology: config.topologies[0],
                channel: config.channels[0],
                fixed: config.fixed.clone(),
                replication,
                seed: 100 + replication as u64,
                out_dir: out_dir.clone(),
            })
            .collect();

        BatchRun {
            batch_root,
            started_at: Local::now(),
            jobs,
            configuration_count: 1,
            replications: 3,
        }
    }

    #[test]
    fn an_interrupt_stops_the_sweep_before_the_next_job() {
        let dir = tempfile::TempDir::new().unwrap();
        let batch = sample_batch(dir.path().join("batch_test"));

        let handle = InterruptHandle::default();
        let listener = handle.new_listener();
        handle.interrupt();

        let runner = CountingRunner::default();
        let result = run_jobs(&batch, &runner, listener, true);

        assert!(result.is_err());
        assert!(result.unwrap_err().is::<SweepInterruptedError>());
        assert_eq!(0, *runner.invocations.lock().unwrap());
    }

    #[test]
    fn without_an_interrupt_every_job_runs() {
        let dir = tempfile::TempDir::new().unwrap();
        let batch = sample_batch(dir.path().join("batch_test"));

        let handle = InterruptHandle::default();
        let listener = handle.new_listener();

        let runner = CountingRunner::default();
        let progress = run_jobs(&batch, &runner, listener, true).unwrap();

        assert_eq!(3, progress.completed);
        assert_eq!(3, *runner.invocations.lock().unwrap());
        assert_eq!(1, progress.configuration_index);
        assert_eq!(3, progress.replication_index);
    }
}
