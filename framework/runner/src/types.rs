/// Recommended error type for a sweep binary's `main` function and any shared code that you write
/// around the runner. This type is compatible with the rest of the crate's APIs so you can use `?`
/// to propagate errors.
pub type SweepBenchResult<T> = anyhow::Result<T>;
