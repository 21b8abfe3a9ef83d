use serde::{Deserialize, Serialize};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Summary of one batch sweep
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    /// The name of the sweep that was run
    pub sweep_name: String,
    /// The timestamped batch root directory the sweep wrote into
    pub batch_root: String,
    /// The time the sweep started
    ///
    /// This is a Unix timestamp in seconds. The batch root directory name carries the same
    /// instant at second resolution.
    pub started_at: i64,
    /// The number of configurations in the sweep
    pub configuration_count: usize,
    /// The number of replications run per configuration
    pub replications: usize,
    /// The base seed replayed by every configuration
    pub base_seed: u64,
    /// The total number of jobs enumerated
    ///
    /// Always `configuration_count * replications`.
    pub total_jobs: usize,
    /// The number of jobs that finished successfully
    ///
    /// Equal to [BatchSummary::total_jobs] when the sweep ran to completion. A sweep is aborted
    /// on the first job failure, so a smaller value means partial results are on disk.
    pub completed_jobs: usize,
    /// Whether the sweep ran to completion
    pub completed: bool,
}

impl BatchSummary {
    /// Create a new batch summary
    pub fn new(
        sweep_name: String,
        batch_root: String,
        started_at: i64,
        configuration_count: usize,
        replications: usize,
        base_seed: u64,
    ) -> Self {
        Self {
            sweep_name,
            batch_root,
            started_at,
            configuration_count,
            replications,
            base_seed,
            total_jobs: configuration_count * replications,
            completed_jobs: 0,
            completed: false,
        }
    }

    /// Set the number of jobs that finished successfully
    pub fn set_completed_jobs(&mut self, completed_jobs: usize) {
        self.completed_jobs = completed_jobs;
        self.completed = completed_jobs == self.total_jobs;
    }
}

/// Append the batch summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_batch_summary(batch_summary: BatchSummary, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_batch_summary(batch_summary, &mut file)?;
    let _ = file.write("\n".as_bytes())?;
    Ok(())
}

/// Serialize the batch summary to a writer
pub fn store_batch_summary<W: Write>(
    batch_summary: BatchSummary,
    writer: &mut W,
) -> anyhow::Result<()> {
    serde_json::to_writer(writer, &batch_summary)?;
    Ok(())
}

/// Load a batch summary from a reader
pub fn load_batch_summary<R: Read>(reader: R) -> anyhow::Result<BatchSummary> {
    let reader = std::io::BufReader::new(reader);
    let batch_summary: BatchSummary = serde_json::from_reader(reader)?;
    Ok(batch_summary)
}

/// Load batch summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_batch_summary].
pub fn load_batch_summaries(path: PathBuf) -> anyhow::Result<Vec<BatchSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut summaries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let summary: BatchSummary = serde_json::from_str(&line)?;
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_summary(sweep_name: &str, completed_jobs: usize) -> BatchSummary {
        let mut summary = BatchSummary::new(
            sweep_name.to_string(),
            format!("results/batch_2026-08-06_10-00-00/{sweep_name}"),
            1754470800,
            4,
            3,
            100,
        );
        summary.set_completed_jobs(completed_jobs);
        summary
    }

    #[test]
    fn total_jobs_is_the_configuration_replication_product() {
        let summary = sample_summary("poisson_traffic", 12);

        assert_eq!(12, summary.total_jobs);
        assert!(summary.completed);
    }

    #[test]
    fn round_trip_through_a_writer() {
        let summary = sample_summary("poisson_traffic", 12);

        let mut buffer = Vec::new();
        store_batch_summary(summary.clone(), &mut buffer).unwrap();
        let loaded = load_batch_summary(buffer.as_slice()).unwrap();

        assert_eq!(summary, loaded);
    }

    #[test]
    fn appends_one_line_per_summary() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("batch_summary.jsonl");

        append_batch_summary(sample_summary("poisson_traffic", 12), path.clone()).unwrap();
        append_batch_summary(sample_summary("app_comparison", 4), path.clone()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(2, raw.lines().count());

        let summaries = load_batch_summaries(path).unwrap();
        assert_eq!(2, summaries.len());
        assert_eq!("poisson_traffic", summaries[0].sweep_name);
        assert!(summaries[0].completed);
        assert_eq!("app_comparison", summaries[1].sweep_name);
        assert!(!summaries[1].completed);
    }
}
