// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from files on disk to tensor batches of triplets.
//
//   labels / .nrrd / .txt
//       │
//       ▼
//   CorpusSource      → ShapeNet or primitives layout
//       │
//       ▼
//   Corpus            → shape + description tables, vectorized
//       │
//       ▼
//   split_train_test  → train / test Partitions, no shared ids
//       │
//       ▼
//   TripletSampler    → uniform anchor / positive / negative
//   SmartBatchSelector→ oversample, score, keep the top bs
//       │
//       ▼
//   TripletLoader     → seeded facade a training loop calls
//       │
//       ▼
//   TripletBatcher    → burn tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// ShapeNet and primitives corpus sources
pub mod loader;

/// Columnar shape and description tables
pub mod table;

/// Identifier → row lookup
pub mod match_index;

/// One half of the split with its indices
pub mod partition;

/// Train/test split on the shape axis
pub mod splitter;

/// Uniform triplet sampling with bounded redraws
pub mod sampler;

/// Lexical-overlap smart batches
pub mod smart_batch;

/// Seeded batch facade
pub mod triplet_loader;

/// Implements Burn's Batcher trait for triplets
pub mod batcher;
