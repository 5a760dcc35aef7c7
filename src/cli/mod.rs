// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   shape-text-triplets --config run.json split
//   shape-text-triplets --config run.json sample --direction t2s --smart
//
// Reports are printed here; everything else is logged through
// tracing.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SampleArgs};
use std::path::PathBuf;

use shape_text_triplets::application::sample_use_case::SampleUseCase;
use shape_text_triplets::application::split_use_case::{PartitionReport, SplitUseCase};
use shape_text_triplets::infra::config::LoaderConfig;

#[derive(Parser, Debug)]
#[command(
    name = "shape-text-triplets",
    version,
    about = "Split a shape/description corpus and draw metric-learning triplet batches."
)]
pub struct Cli {
    /// JSON loader configuration
    #[arg(long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = LoaderConfig::from_file(&self.config)?;
        tracing::info!("Using config '{}' ({:?})", self.config.display(), config.dataset);

        match self.command {
            Commands::Split        => run_split(config),
            Commands::Sample(args) => run_sample(config, args),
        }
    }
}

fn print_partition(report: &PartitionReport) {
    println!(
        "{:<5} {:>7} shapes {:>7} descriptions {:>7} identifiers",
        report.name, report.shapes, report.descriptions, report.identifiers
    );
    for (category, count) in &report.categories {
        println!("        {:<24} {:>7}", category, count);
    }
}

fn run_split(config: LoaderConfig) -> Result<()> {
    let report = SplitUseCase::new(config).execute()?;

    println!("vocabulary size: {}", report.vocabulary_size);
    print_partition(&report.train);
    print_partition(&report.test);
    print_partition(&report.corpus);
    Ok(())
}

fn run_sample(config: LoaderConfig, args: SampleArgs) -> Result<()> {
    let summaries = SampleUseCase::new(config, args.into())?.execute()?;

    for s in &summaries {
        println!(
            "batch {} ({}): anchors {:?} → {:?}",
            s.index, s.direction, s.anchor_dims, s.counterpart_dims
        );
        for (i, id) in s.anchor_ids.iter().enumerate() {
            let score = s
                .scores
                .as_ref()
                .map(|scores| format!("  score {}", scores[i]))
                .unwrap_or_default();
            println!(
                "  {:<32} {:<20} ≠ {:<20}{}",
                id, s.anchor_categories[i], s.negative_categories[i], score
            );
        }
    }
    Ok(())
}
