// Report-level error taxonomy

use thiserror::Error;

/// Failures that abort a whole report. Disk and partition problems never
/// reach this type; they degrade to zeroed or omitted fields inside the
/// sampler instead.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A required single-shot OS query (CPU times, network counters, memory,
    /// swap, host info) could not be performed.
    #[error("metrics unavailable: {0}")]
    Unavailable(String),

    /// The two snapshots disagree on the number of logical cores. Per-core
    /// fractions would no longer align by index, so this is a hard failure.
    #[error("cpu core count changed between samples: {first} then {second}")]
    CoreCountMismatch { first: usize, second: usize },

    /// The blocking collection task was cancelled or panicked.
    #[error("collection task failed: {0}")]
    Join(String),
}
