// ============================================================
// Layer 2 — SampleUseCase
// ============================================================
// Draws batches the way a training loop would and summarises
// each one:
//
//   Step 1: Apply CLI overrides (seed, batch size)
//   Step 2: Prepare corpus             (application/corpus)
//   Step 3: Build the TripletLoader    (Layer 4 - data)
//   Step 4: Draw N batches, uniform or smart
//   Step 5: Stack each into tensors    (Layer 4 - batcher)
//
// Tensors are built on the CPU NdArray backend; only their
// dims are reported.

use anyhow::Result;
use burn::backend::NdArray;

use crate::application::corpus::prepare_corpus;
use crate::data::batcher::{TensorBatch, TripletBatcher};
use crate::data::partition::Partition;
use crate::data::table::CorpusTable;
use crate::data::triplet_loader::TripletLoader;
use crate::domain::triplet::{Direction, SplitKind, TripletBatch};
use crate::infra::config::LoaderConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub split:     SplitKind,
    pub direction: Direction,
    pub smart:     bool,
    pub batches:   usize,
    pub seed:      Option<u64>,
    pub bs:        Option<usize>,
}

/// What one drawn batch contained.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub index:               usize,
    pub direction:           Direction,
    pub anchor_ids:          Vec<String>,
    pub anchor_categories:   Vec<String>,
    pub negative_categories: Vec<String>,
    /// Overlap scores of the kept candidates, smart batches only
    pub scores:              Option<Vec<usize>>,
    pub anchor_dims:         Vec<usize>,
    pub counterpart_dims:    Vec<usize>,
}

pub struct SampleUseCase {
    config:  LoaderConfig,
    options: SampleOptions,
}

impl SampleUseCase {
    pub fn new(mut config: LoaderConfig, options: SampleOptions) -> Result<Self> {
        // ── Step 1: CLI overrides ─────────────────────────────────────────────
        if let Some(seed) = options.seed {
            config.seed = seed;
        }
        if let Some(bs) = options.bs {
            config.hyper_parameters.bs = bs;
        }
        config.validate()?;
        Ok(Self { config, options })
    }

    pub fn execute(&self) -> Result<Vec<BatchSummary>> {
        let opts = &self.options;

        let prepared   = prepare_corpus(&self.config)?;
        let settings   = self.config.loader_settings(prepared.vocabulary_size);
        let mut loader = TripletLoader::new(&prepared.corpus, settings);
        let batcher    = TripletBatcher::<NdArray>::new(Default::default());

        tracing::info!(
            "Drawing {} {} {} batches of {} from {} (vocabulary size {})",
            opts.batches,
            if opts.smart { "smart" } else { "uniform" },
            opts.direction,
            loader.batch_size(),
            opts.split,
            loader.vocabulary_size()
        );

        let mut summaries = Vec::with_capacity(opts.batches);
        for index in 0..opts.batches {
            let (batch, scores) = if opts.smart {
                let (selection, batch) = loader.smart_batch(opts.split, opts.direction)?;
                let kept = selection.ranked.iter().map(|&i| selection.scores[i]).collect();
                (batch, Some(kept))
            } else {
                (loader.batch(opts.split, opts.direction)?, None)
            };

            let mut summary = summarize(index, loader.partition(opts.split), &batch, scores);

            let (anchor, counterpart) = match batcher.tensors(batch) {
                TensorBatch::ShapeToText(t) => (t.shapes.dims().to_vec(), t.positive_descs.dims().to_vec()),
                TensorBatch::TextToShape(t) => (t.descs.dims().to_vec(), t.positive_shapes.dims().to_vec()),
            };
            summary.anchor_dims      = anchor;
            summary.counterpart_dims = counterpart;

            tracing::debug!(
                "Batch {}: anchors {:?} tensors {:?} / {:?}",
                index,
                summary.anchor_ids,
                summary.anchor_dims,
                summary.counterpart_dims
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

fn summarize(
    index:     usize,
    partition: &Partition,
    batch:     &TripletBatch,
    scores:    Option<Vec<usize>>,
) -> BatchSummary {
    let shapes = partition.shapes();
    let descs  = partition.descriptions();

    // anchor table, negative table
    let (anchors, negatives) = match batch.direction() {
        Direction::ShapeToText => ((shapes.ids(), shapes.categories()), descs.categories()),
        Direction::TextToShape => ((descs.ids(), descs.categories()), shapes.categories()),
    };

    let rows = batch.rows();
    BatchSummary {
        index,
        direction:           batch.direction(),
        anchor_ids:          rows.iter().map(|r| anchors.0[r.anchor].clone()).collect(),
        anchor_categories:   rows.iter().map(|r| anchors.1[r.anchor].clone()).collect(),
        negative_categories: rows.iter().map(|r| negatives[r.negative].clone()).collect(),
        scores,
        anchor_dims:         Vec::new(),
        counterpart_dims:    Vec::new(),
    }
}
