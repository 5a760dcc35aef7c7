// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing the shape/text corpus
// and the triplets mined from it.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - NO sampling logic (that lives in Layer 4)
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Shape and description records plus voxel grids
pub mod records;

// Triplet types, sampling direction and partition selector
pub mod triplet;

// Boundary abstractions (corpus sources, vectorizers)
pub mod traits;
