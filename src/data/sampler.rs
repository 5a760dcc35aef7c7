// ============================================================
// Layer 4 — Uniform Triplet Sampler
// ============================================================
// Draws anchor / positive / negative triplets uniformly at
// random from one partition.
//
// Shape → Text, per triplet:
//
//   1. draw a random shape row (the anchor)
//   2. look up a description with the same identifier
//        no match → throw the anchor away and draw again
//   3. draw random description rows until one has a
//      category different from the anchor's (the negative)
//   4. emit (anchor shape, positive tokens, negative tokens)
//
// Text → Shape is the mirror image: description anchor,
// positive and negative shapes.
//
// Every redraw loop is capped at `max_attempts`. Partitions
// where no negative can exist (one category only) or that are
// empty are reported before any loop starts.
//
// The RNG is passed into every call. Two samplers fed the same
// seed over the same partition produce identical triplets.
//
// Reference: rand crate documentation (Rng::gen_range)

use rand::Rng;

use crate::data::partition::Partition;
use crate::data::table::CorpusTable;
use crate::domain::triplet::{ShapeToTextTriplet, TextToShapeTriplet, TripletRows};
use crate::error::SamplingError;

/// Default cap on redraws inside one rejection loop
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Run `draw` until it yields a value, at most `max_attempts` times.
pub(crate) fn retry<T>(
    what:         &'static str,
    max_attempts: usize,
    mut draw:     impl FnMut() -> Option<T>,
) -> Result<T, SamplingError> {
    for attempt in 1..=max_attempts {
        if let Some(found) = draw() {
            if attempt > 1 {
                tracing::trace!("Drew {} after {} attempts", what, attempt);
            }
            return Ok(found);
        }
    }
    Err(SamplingError::AttemptsExhausted { what, attempts: max_attempts })
}

#[derive(Debug, Clone, Copy)]
pub struct TripletSampler<'a> {
    partition:    &'a Partition,
    max_attempts: usize,
}

impl<'a> TripletSampler<'a> {
    pub fn new(partition: &'a Partition, max_attempts: usize) -> Self {
        Self { partition, max_attempts }
    }

    pub fn partition(&self) -> &'a Partition {
        self.partition
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    // ─── Positive lookup ──────────────────────────────────────────────────────

    /// Random description row sharing `shape_id`, or None.
    pub fn find_positive_description<R: Rng + ?Sized>(
        &self,
        shape_id: &str,
        rng:      &mut R,
    ) -> Option<usize> {
        self.partition.description_index().choose(shape_id, rng)
    }

    /// Random shape row sharing `description_id`, or None.
    pub fn find_positive_shape<R: Rng + ?Sized>(
        &self,
        description_id: &str,
        rng:            &mut R,
    ) -> Option<usize> {
        self.partition.shape_index().choose(description_id, rng)
    }

    // ─── Anchor draws ─────────────────────────────────────────────────────────

    /// Draw a shape row that has at least one matching description.
    /// Returns (shape row, positive description row).
    pub fn draw_shape_anchor<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(usize, usize), SamplingError> {
        self.require_rows()?;
        let shapes = self.partition.shapes();

        retry("a shape with a matching description", self.max_attempts, || {
            let anchor = rng.gen_range(0..shapes.len());
            self.find_positive_description(&shapes.ids()[anchor], rng)
                .map(|positive| (anchor, positive))
        })
    }

    /// Draw a description row that has at least one matching shape.
    /// Returns (description row, positive shape row).
    pub fn draw_description_anchor<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(usize, usize), SamplingError> {
        self.require_rows()?;
        let descriptions = self.partition.descriptions();

        retry("a description with a matching shape", self.max_attempts, || {
            let anchor = rng.gen_range(0..descriptions.len());
            self.find_positive_shape(&descriptions.ids()[anchor], rng)
                .map(|positive| (anchor, positive))
        })
    }

    // ─── Negative draws ───────────────────────────────────────────────────────

    /// Random description row whose category differs from `category`.
    pub fn find_negative_description<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng:      &mut R,
    ) -> Result<usize, SamplingError> {
        if self.partition.description_categories().outside(category) == 0 {
            return Err(SamplingError::NoAlternateCategory {
                table:    "description",
                category: category.to_string(),
            });
        }
        let categories = self.partition.descriptions().categories();

        retry("a negative description", self.max_attempts, || {
            let row = rng.gen_range(0..categories.len());
            (categories[row] != category).then_some(row)
        })
    }

    /// Random shape row whose category differs from `category`.
    pub fn find_negative_shape<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng:      &mut R,
    ) -> Result<usize, SamplingError> {
        if self.partition.shape_categories().outside(category) == 0 {
            return Err(SamplingError::NoAlternateCategory {
                table:    "shape",
                category: category.to_string(),
            });
        }
        let categories = self.partition.shapes().categories();

        retry("a negative shape", self.max_attempts, || {
            let row = rng.gen_range(0..categories.len());
            (categories[row] != category).then_some(row)
        })
    }

    // ─── Triplets ─────────────────────────────────────────────────────────────

    pub fn sample_shape_to_text<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ShapeToTextTriplet, SamplingError> {
        let (anchor, positive) = self.draw_shape_anchor(rng)?;
        let category = &self.partition.shapes().categories()[anchor];
        let negative = self.find_negative_description(category, rng)?;

        Ok(ShapeToTextTriplet {
            shape:         self.partition.shape(anchor),
            positive_desc: self.partition.description(positive).to_vec(),
            negative_desc: self.partition.description(negative).to_vec(),
            rows:          TripletRows { anchor, positive, negative },
        })
    }

    pub fn sample_text_to_shape<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<TextToShapeTriplet, SamplingError> {
        let (anchor, positive) = self.draw_description_anchor(rng)?;
        let category = &self.partition.descriptions().categories()[anchor];
        let negative = self.find_negative_shape(category, rng)?;

        Ok(TextToShapeTriplet {
            desc:           self.partition.description(anchor).to_vec(),
            positive_shape: self.partition.shape(positive),
            negative_shape: self.partition.shape(negative),
            rows:           TripletRows { anchor, positive, negative },
        })
    }

    /// `batch_size` independent Shape → Text draws
    pub fn shape_to_text_batch<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng:        &mut R,
    ) -> Result<Vec<ShapeToTextTriplet>, SamplingError> {
        (0..batch_size).map(|_| self.sample_shape_to_text(rng)).collect()
    }

    /// `batch_size` independent Text → Shape draws
    pub fn text_to_shape_batch<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng:        &mut R,
    ) -> Result<Vec<TextToShapeTriplet>, SamplingError> {
        (0..batch_size).map(|_| self.sample_text_to_shape(rng)).collect()
    }

    fn require_rows(&self) -> Result<(), SamplingError> {
        let table = if self.partition.shape_len() == 0 {
            "shape"
        } else if self.partition.description_len() == 0 {
            "description"
        } else {
            return Ok(());
        };
        Err(SamplingError::EmptyPartition {
            partition: self.partition.name().to_string(),
            table,
        })
    }
}
