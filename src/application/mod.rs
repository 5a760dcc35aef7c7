// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Wires configuration, corpus loading and the triplet loader
// together for one command:
//
//   corpus.rs          config → vectorizer → source → Corpus
//   split_use_case     report partition sizes and categories
//   sample_use_case    draw batches and summarise them
//
// No sampling logic lives here, and nothing is printed; the
// CLI decides how reports are shown.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Shared corpus preparation
pub mod corpus;

/// Train/test split report
pub mod split_use_case;

/// Batch drawing and summaries
pub mod sample_use_case;
