//! # Loadnet Loadio Builtins
//! Tunables of the load medium. These are compile-time constants; the link
//! configuration copies them into its fields so tests can override them.

/// Cap on the number of load worker threads per pipeline. The effective
/// worker count is `max(1, min(MAX_CONCURRENCY, host_parallelism))`.
/// Setting this to 1 selects single-core pinned mode, which only works when
/// both ends share one scheduler; the default saturates every virtual core,
/// which is required to traverse hypervisors that migrate virtual cores
/// across physical cores.
pub const MAX_CONCURRENCY: usize = 999;

/// First-order low-pass divisor for the sampler's baseline tick rate.
/// Smaller values let long runs of identical chips drag the baseline;
/// larger values make the slicer respond sluggishly to load shifts.
pub const SAMPLE_AVERAGING_FACTOR: f64 = 8.0;
