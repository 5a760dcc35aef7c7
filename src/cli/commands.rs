// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `split` and `sample`.
//
// clap's derive macros generate help text, error messages for
// bad values, and the s2t / t2s and train / test choices from
// the domain enums' ValueEnum derives.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use shape_text_triplets::application::sample_use_case::SampleOptions;
use shape_text_triplets::domain::triplet::{Direction, SplitKind};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the corpus, split it and report both partitions
    Split,

    /// Draw triplet batches and log a summary of each
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Partition to draw from
    #[arg(long, value_enum, default_value_t = SplitKind::Train)]
    pub split: SplitKind,

    /// Retrieval direction (s2t: shape anchors, t2s: description anchors)
    #[arg(long, value_enum, default_value_t = Direction::ShapeToText)]
    pub direction: Direction,

    /// Build lexically clustered batches instead of uniform ones
    #[arg(long)]
    pub smart: bool,

    /// Number of batches to draw
    #[arg(long, default_value_t = 1)]
    pub batches: usize,

    /// Override the config seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override hyper_parameters.bs
    #[arg(long)]
    pub bs: Option<usize>,
}

/// The application layer never sees clap types.
impl From<SampleArgs> for SampleOptions {
    fn from(a: SampleArgs) -> Self {
        SampleOptions {
            split:     a.split,
            direction: a.direction,
            smart:     a.smart,
            batches:   a.batches,
            seed:      a.seed,
            bs:        a.bs,
        }
    }
}
