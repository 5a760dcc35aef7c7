// ============================================================
// Sampling Errors
// ============================================================
// Load and configuration failures are boundary errors and go
// through anyhow. The variants here cover the sampling layer:
// degenerate partitions that would otherwise make a
// rejection loop spin forever.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplingError {
    #[error("partition '{partition}' has no {table} rows to sample from")]
    EmptyPartition {
        partition: String,
        table:     &'static str,
    },

    #[error("no {table} row outside category '{category}' exists for a negative")]
    NoAlternateCategory {
        table:    &'static str,
        category: String,
    },

    #[error("no candidate in the smart batch differs from identifier '{identifier}'")]
    NoDistinctIdentifier { identifier: String },

    #[error("a pool of {batch_size} x {oversample} candidates exceeds the limit of {limit}")]
    PoolTooLarge {
        batch_size: usize,
        oversample: usize,
        limit:      usize,
    },

    #[error("gave up drawing {what} after {attempts} attempts")]
    AttemptsExhausted {
        what:     &'static str,
        attempts: usize,
    },
}
