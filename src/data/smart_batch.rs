// ============================================================
// Layer 4 — Smart Batch Selector
// ============================================================
// Builds batches whose members are lexically related, so the
// negatives inside a batch are hard rather than trivially
// different.
//
// Selection (shared by both directions):
//
//   1. Oversample — draw batch_size * oversample shape rows
//      (with replacement). A shape without a description is
//      replaced in place by a fresh draw.
//   2. Fetch one positive description per candidate.
//   3. Count every non-padding token id across the pool.
//   4. Score each candidate against the FIRST candidate:
//
//        score = Σ freq(t)  for t in set(ref) ∩ set(candidate)
//
//   5. Stable sort by score, descending (ties keep draw
//      order) and keep the top batch_size candidates.
//
// The reference always scores the maximum against itself and
// sits at position 0, so it is always selected.
//
// Negatives for a smart batch come only from the selection:
// a random selected candidate is redrawn while its identifier
// equals the anchor's. The selection is returned as a value
// and passed into negative mining explicitly.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Rust Book §8 (Hash Maps)

use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::data::partition::Partition;
use crate::data::sampler::{retry, TripletSampler};
use crate::data::table::CorpusTable;
use crate::domain::records::PAD_TOKEN;
use crate::domain::triplet::{ShapeToTextTriplet, TextToShapeTriplet, TripletRows};
use crate::error::SamplingError;

/// Largest candidate pool (batch_size * oversample) a selector draws
pub const MAX_POOL_SIZE: usize = 1 << 20;

/// `batch_size * oversample`, or an error past MAX_POOL_SIZE.
pub fn pool_size(batch_size: usize, oversample: usize) -> Result<usize, SamplingError> {
    batch_size
        .checked_mul(oversample)
        .filter(|&size| size <= MAX_POOL_SIZE)
        .ok_or(SamplingError::PoolTooLarge {
            batch_size,
            oversample,
            limit: MAX_POOL_SIZE,
        })
}

// ─── Scoring helpers ──────────────────────────────────────────────────────────

/// Occurrences of every non-padding token id across `pool`.
pub fn token_frequencies<'t, I>(pool: I) -> HashMap<u32, usize>
where
    I: IntoIterator<Item = &'t [u32]>,
{
    let mut freq: HashMap<u32, usize> = HashMap::new();
    for tokens in pool {
        for &token in tokens.iter().filter(|&&t| t != PAD_TOKEN) {
            *freq.entry(token).or_insert(0) += 1;
        }
    }
    freq
}

/// Frequency-weighted overlap between two token vectors.
/// Each shared distinct token contributes its pool frequency;
/// padding has no frequency and contributes nothing.
pub fn overlap_score(reference: &[u32], candidate: &[u32], freq: &HashMap<u32, usize>) -> usize {
    let reference: HashSet<u32> = reference.iter().copied().collect();
    let candidate: HashSet<u32> = candidate.iter().copied().collect();
    reference
        .intersection(&candidate)
        .map(|token| freq.get(token).copied().unwrap_or(0))
        .sum()
}

/// Pool positions of the `keep` best scores, highest first,
/// ties in original order.
pub fn rank_top(scores: &[usize], keep: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
    order.truncate(keep);
    order
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// One oversampled candidate: a shape row and the description
/// row drawn as its positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCandidate {
    pub shape_row:       usize,
    pub description_row: usize,
}

/// Result of one smart-batch selection.
#[derive(Debug, Clone)]
pub struct SmartSelection {
    /// Every oversampled candidate, in draw order
    pub pool:     Vec<PoolCandidate>,
    /// Score of each pool entry against pool[0]
    pub scores:   Vec<usize>,
    /// Positions into `pool` that were kept, best first
    pub ranked:   Vec<usize>,
    /// The kept candidates (`pool[ranked[i]]`)
    pub selected: Vec<PoolCandidate>,
}

impl SmartSelection {
    /// Shape rows of the selected candidates
    pub fn selected_shape_rows(&self) -> Vec<usize> {
        self.selected.iter().map(|c| c.shape_row).collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmartBatchSelector<'a> {
    sampler:    TripletSampler<'a>,
    batch_size: usize,
    oversample: usize,
}

impl<'a> SmartBatchSelector<'a> {
    pub fn new(
        partition:    &'a Partition,
        batch_size:   usize,
        oversample:   usize,
        max_attempts: usize,
    ) -> Self {
        Self {
            sampler: TripletSampler::new(partition, max_attempts),
            batch_size,
            oversample: oversample.max(1),
        }
    }

    fn partition(&self) -> &'a Partition {
        self.sampler.partition()
    }

    /// Oversample, score and rank a candidate pool.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SmartSelection, SamplingError> {
        let pool_size = pool_size(self.batch_size, self.oversample)?;

        let pool = (0..pool_size)
            .map(|_| {
                self.sampler
                    .draw_shape_anchor(rng)
                    .map(|(shape_row, description_row)| PoolCandidate { shape_row, description_row })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let partition = self.partition();
        let positives: Vec<&[u32]> = pool
            .iter()
            .map(|c| partition.description(c.description_row))
            .collect();

        let freq = token_frequencies(positives.iter().copied());
        let scores: Vec<usize> = match positives.first() {
            Some(reference) => positives
                .iter()
                .map(|candidate| overlap_score(reference, candidate, &freq))
                .collect(),
            None => Vec::new(),
        };

        let ranked   = rank_top(&scores, self.batch_size);
        let selected = ranked.iter().map(|&i| pool[i]).collect();

        tracing::debug!(
            "Smart selection: pool={} kept={} top_score={}",
            pool.len(),
            ranked.len(),
            scores.first().copied().unwrap_or(0),
        );

        Ok(SmartSelection { pool, scores, ranked, selected })
    }

    /// Smart negative mining: a random selected candidate whose
    /// identifier differs from `anchor_id`.
    pub fn find_smart_negative<R: Rng + ?Sized>(
        &self,
        selection: &SmartSelection,
        anchor_id: &str,
        rng:       &mut R,
    ) -> Result<PoolCandidate, SamplingError> {
        let ids = self.partition().shapes().ids();
        if selection.selected.iter().all(|c| ids[c.shape_row] == anchor_id) {
            return Err(SamplingError::NoDistinctIdentifier {
                identifier: anchor_id.to_string(),
            });
        }

        retry("a smart negative", self.sampler.max_attempts(), || {
            let candidate = selection.selected[rng.gen_range(0..selection.selected.len())];
            (ids[candidate.shape_row] != anchor_id).then_some(candidate)
        })
    }

    /// Smart Shape → Text batch. Returns the selection alongside
    /// the triplets.
    pub fn shape_to_text_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(SmartSelection, Vec<ShapeToTextTriplet>), SamplingError> {
        let selection = self.select(rng)?;
        let partition = self.partition();
        let ids       = partition.shapes().ids();

        let mut batch = Vec::with_capacity(selection.len());
        for candidate in &selection.selected {
            let anchor   = candidate.shape_row;
            let positive = self
                .sampler
                .find_positive_description(&ids[anchor], rng)
                .unwrap_or(candidate.description_row);
            let negative = self.find_smart_negative(&selection, &ids[anchor], rng)?.description_row;

            batch.push(ShapeToTextTriplet {
                shape:         partition.shape(anchor),
                positive_desc: partition.description(positive).to_vec(),
                negative_desc: partition.description(negative).to_vec(),
                rows:          TripletRows { anchor, positive, negative },
            });
        }
        Ok((selection, batch))
    }

    /// Smart Text → Shape batch. The anchor is a positive
    /// description of each selected shape.
    pub fn text_to_shape_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(SmartSelection, Vec<TextToShapeTriplet>), SamplingError> {
        let selection = self.select(rng)?;
        let partition = self.partition();
        let ids       = partition.shapes().ids();

        let mut batch = Vec::with_capacity(selection.len());
        for candidate in &selection.selected {
            let positive = candidate.shape_row;
            let anchor   = self
                .sampler
                .find_positive_description(&ids[positive], rng)
                .unwrap_or(candidate.description_row);
            let negative = self.find_smart_negative(&selection, &ids[positive], rng)?.shape_row;

            batch.push(TextToShapeTriplet {
                desc:           partition.description(anchor).to_vec(),
                positive_shape: partition.shape(positive),
                negative_shape: partition.shape(negative),
                rows:           TripletRows { anchor, positive, negative },
            });
        }
        Ok((selection, batch))
    }
}
