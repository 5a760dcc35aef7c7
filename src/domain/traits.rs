// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two collaborators at the edge of the batching engine:
//
//   CorpusSource — turns files on disk into shape and
//                  description records
//   Vectorizer   — turns a description into a fixed-length
//                  sequence of token ids
//
// The data layer only sees these traits, so in-memory test
// corpora and toy vectorizers plug in the same way the real
// ShapeNet/primitives loaders and vocabulary tokenizer do.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use rand::RngCore;

use crate::domain::records::RawCorpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can load a raw shape/description corpus.
///
/// Implementations:
///   - ShapeNetSource   → labels CSV + directory of .nrrd files
///   - PrimitivesSource → per-folder shapes sharing descriptions
pub trait CorpusSource {
    /// Load every shape and description. Sources that attach
    /// descriptions at random draw from `rng`.
    fn load(&self, rng: &mut dyn RngCore) -> Result<RawCorpus>;
}

// ─── Vectorizer ───────────────────────────────────────────────────────────────
/// Maps description text to token ids over a fixed vocabulary.
pub trait Vectorizer {
    /// Fixed-length token ids, padded with PAD_TOKEN (0).
    /// Text the vectorizer cannot encode is an error.
    fn description_to_vector(&self, text: &str) -> Result<Vec<u32>>;

    /// Number of distinct ids the vectorizer can produce
    fn vocabulary_size(&self) -> usize;
}
