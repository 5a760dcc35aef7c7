// ============================================================
// Layer 4 — Triplet Loader
// ============================================================
// The entry point the training loop talks to. It owns:
//
//   train / test partitions   built once by the splitter
//   StdRng                    seeded once, used for every draw
//   bs / oversample           batch shape
//
// and hands out batches on demand:
//
//   batch(split, direction)        uniform triplets
//   smart_batch(split, direction)  lexically clustered triplets
//
// Batches are not cached. A loader is single-threaded; give
// each worker its own loader (and seed) for parallel batch
// production.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::partition::Partition;
use crate::data::sampler::{TripletSampler, DEFAULT_MAX_ATTEMPTS};
use crate::data::smart_batch::{SmartBatchSelector, SmartSelection};
use crate::data::splitter::{split_train_test, DEFAULT_TRAIN_FRACTION};
use crate::data::table::Corpus;
use crate::domain::triplet::{Direction, SplitKind, TripletBatch};
use crate::error::SamplingError;

/// Batch-shape and sampling settings for a loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderSettings {
    pub batch_size:      usize,
    pub oversample:      usize,
    pub seed:            u64,
    pub train_fraction:  f64,
    pub max_attempts:    usize,
    pub vocabulary_size: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            batch_size:      32,
            oversample:      4,
            seed:            1200,
            train_fraction:  DEFAULT_TRAIN_FRACTION,
            max_attempts:    DEFAULT_MAX_ATTEMPTS,
            vocabulary_size: 0,
        }
    }
}

pub struct TripletLoader {
    train:    Partition,
    test:     Partition,
    rng:      StdRng,
    settings: LoaderSettings,
}

impl TripletLoader {
    /// Split `corpus` and seed the generator.
    pub fn new(corpus: &Corpus, settings: LoaderSettings) -> Self {
        let (train, test) = split_train_test(corpus, settings.train_fraction);
        Self {
            train,
            test,
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
        }
    }

    pub fn partition(&self, split: SplitKind) -> &Partition {
        match split {
            SplitKind::Train => &self.train,
            SplitKind::Test  => &self.test,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.settings.batch_size
    }

    pub fn vocabulary_size(&self) -> usize {
        self.settings.vocabulary_size
    }

    /// `bs` independent uniform triplets.
    pub fn batch(
        &mut self,
        split:     SplitKind,
        direction: Direction,
    ) -> Result<TripletBatch, SamplingError> {
        let partition = match split {
            SplitKind::Train => &self.train,
            SplitKind::Test  => &self.test,
        };
        let sampler = TripletSampler::new(partition, self.settings.max_attempts);
        let bs      = self.settings.batch_size;

        let batch = match direction {
            Direction::ShapeToText => {
                TripletBatch::ShapeToText(sampler.shape_to_text_batch(bs, &mut self.rng)?)
            }
            Direction::TextToShape => {
                TripletBatch::TextToShape(sampler.text_to_shape_batch(bs, &mut self.rng)?)
            }
        };

        tracing::debug!("Uniform {} batch of {} from {}", direction, batch.len(), split);
        Ok(batch)
    }

    /// Smart batch plus the selection it was built from.
    pub fn smart_batch(
        &mut self,
        split:     SplitKind,
        direction: Direction,
    ) -> Result<(SmartSelection, TripletBatch), SamplingError> {
        let partition = match split {
            SplitKind::Train => &self.train,
            SplitKind::Test  => &self.test,
        };
        let selector = SmartBatchSelector::new(
            partition,
            self.settings.batch_size,
            self.settings.oversample,
            self.settings.max_attempts,
        );

        let (selection, batch) = match direction {
            Direction::ShapeToText => {
                let (selection, items) = selector.shape_to_text_batch(&mut self.rng)?;
                (selection, TripletBatch::ShapeToText(items))
            }
            Direction::TextToShape => {
                let (selection, items) = selector.text_to_shape_batch(&mut self.rng)?;
                (selection, TripletBatch::TextToShape(items))
            }
        };

        tracing::debug!(
            "Smart {} batch of {} from {} (pool {})",
            direction,
            batch.len(),
            split,
            selection.pool.len(),
        );
        Ok((selection, batch))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{CorpusTable, DescriptionTable, ShapeTable};
    use crate::domain::records::{DescriptionRecord, ShapeRecord, VoxelGrid};

    fn corpus() -> Corpus {
        let categories = ["chair", "table", "lamp", "sofa"];
        let mut shapes = ShapeTable::new();
        let mut descs  = DescriptionTable::new();
        for i in 0..40u32 {
            let id  = format!("m{i}");
            let cat = categories[i as usize % 4];
            shapes.push(ShapeRecord::new(
                id.clone(),
                VoxelGrid::new(vec![2, 2, 2], vec![i as f32; 8]).unwrap(),
                cat,
            ));
            for j in 0..2 {
                descs.push(DescriptionRecord {
                    id:       id.clone(),
                    text:     format!("{cat} number {i} variant {j}"),
                    tokens:   vec![i % 4 + 1, 10 + i, 100 + j, 0, 0],
                    category: cat.to_string(),
                });
            }
        }
        Corpus::new(shapes, descs)
    }

    fn settings(seed: u64) -> LoaderSettings {
        LoaderSettings { batch_size: 8, oversample: 3, seed, ..LoaderSettings::default() }
    }

    #[test]
    fn test_partitions_are_split_90_10() {
        let loader = TripletLoader::new(&corpus(), settings(1));
        assert_eq!(loader.partition(SplitKind::Train).shape_len(), 36);
        assert_eq!(loader.partition(SplitKind::Test).shape_len(),  4);
        assert_eq!(loader.partition(SplitKind::Test).description_len(), 8);
    }

    #[test]
    fn test_uniform_batches_have_batch_size() {
        let mut loader = TripletLoader::new(&corpus(), settings(1));
        for split in [SplitKind::Train, SplitKind::Test] {
            for direction in [Direction::ShapeToText, Direction::TextToShape] {
                let batch = loader.batch(split, direction).unwrap();
                assert_eq!(batch.len(), 8);
                assert_eq!(batch.direction(), direction);
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_batches() {
        let data = corpus();
        let mut a = TripletLoader::new(&data, settings(1200));
        let mut b = TripletLoader::new(&data, settings(1200));

        for _ in 0..5 {
            let ra = a.batch(SplitKind::Train, Direction::ShapeToText).unwrap().rows();
            let rb = b.batch(SplitKind::Train, Direction::ShapeToText).unwrap().rows();
            assert_eq!(ra, rb);

            let (_, sa) = a.smart_batch(SplitKind::Train, Direction::TextToShape).unwrap();
            let (_, sb) = b.smart_batch(SplitKind::Train, Direction::TextToShape).unwrap();
            assert_eq!(sa.rows(), sb.rows());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let data = corpus();
        let mut a = TripletLoader::new(&data, settings(1));
        let mut b = TripletLoader::new(&data, settings(2));

        let ra: Vec<_> = (0..4)
            .flat_map(|_| a.batch(SplitKind::Train, Direction::ShapeToText).unwrap().rows())
            .collect();
        let rb: Vec<_> = (0..4)
            .flat_map(|_| b.batch(SplitKind::Train, Direction::ShapeToText).unwrap().rows())
            .collect();
        assert_ne!(ra, rb);
    }

    #[test]
    fn test_smart_batch_selection_matches_batch() {
        let mut loader = TripletLoader::new(&corpus(), settings(9));
        let (selection, batch) = loader
            .smart_batch(SplitKind::Train, Direction::ShapeToText)
            .unwrap();

        assert_eq!(selection.len(), 8);
        assert_eq!(selection.pool.len(), 24);
        let anchors: Vec<usize> = batch.rows().iter().map(|r| r.anchor).collect();
        assert_eq!(anchors, selection.selected_shape_rows());
    }

    #[test]
    fn test_uniform_triplets_respect_categories() {
        let mut loader = TripletLoader::new(&corpus(), settings(77));
        let batch = loader.batch(SplitKind::Test, Direction::TextToShape).unwrap();

        let test   = loader.partition(SplitKind::Test);
        let shapes = test.shapes();
        let descs  = test.descriptions();
        for rows in batch.rows() {
            assert_eq!(shapes.ids()[rows.positive], descs.ids()[rows.anchor]);
            assert_ne!(shapes.categories()[rows.negative], descs.categories()[rows.anchor]);
        }
    }
}
