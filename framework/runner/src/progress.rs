use indicatif::{ProgressBar, ProgressStyle};

/// Displays a progress bar over the total job count, advanced once per completed job.
pub(crate) fn job_progress_bar(total_jobs: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_jobs as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} jobs [{elapsed_precise}]",
        )
        .expect("Failed to set progress style")
        .progress_chars("#>-"),
    );
    pb
}
