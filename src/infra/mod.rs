// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File formats and external collaborators used by the layers
// above:
//
//   config.rs      — JSON loader configuration
//                    serde derives with defaults, plus
//                    validation of values the samplers
//                    cannot work with.
//
//   vectorizer.rs  — Description → token id vector
//                    A word-level HuggingFace tokenizer built
//                    from a one-word-per-line vocabulary.
//
//   nrrd.rs        — Volumetric shape files
//                    Raw or gzip NRRD payloads widened to f32.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Loader configuration file
pub mod config;

/// Vocabulary-backed description vectorizer
pub mod vectorizer;

/// NRRD voxel grid reader
pub mod nrrd;
