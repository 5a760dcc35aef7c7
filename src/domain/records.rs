// ============================================================
// Layer 3 — Corpus Record Types
// ============================================================
// A corpus links two modalities through a shared identifier:
//
//   ShapeRecord        identifier + voxel grid + category
//   DescriptionRecord  identifier + text + token ids + category
//
// One shape may have many descriptions. In synthetic
// "primitives" data several shapes may also share one
// description identifier pool.
//
// Categories are only used to pick negatives, so every
// record carries one. Shapes with no matching description
// fall back to CATEGORY_NONE.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Category assigned to shapes that no description refers to.
pub const CATEGORY_NONE: &str = "none";

/// Token id reserved for padding in description vectors.
pub const PAD_TOKEN: u32 = 0;

/// A dense volumetric grid stored in row-major (C) order.
///
/// `dims` is either `[depth, height, width]` or
/// `[channels, depth, height, width]` (e.g. RGBA voxels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelGrid {
    pub dims:   Vec<usize>,
    pub values: Vec<f32>,
}

impl VoxelGrid {
    /// Build a grid, checking that `values` fills `dims` exactly.
    pub fn new(dims: Vec<usize>, values: Vec<f32>) -> Option<Self> {
        let expected: usize = dims.iter().product();
        if dims.is_empty() || expected != values.len() {
            return None;
        }
        Some(Self { dims, values })
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dimensions normalised to `[channels, depth, height, width]`.
    /// Rank-3 grids get a single channel; other ranks are not
    /// volumetric and return None.
    pub fn channel_dims(&self) -> Option<[usize; 4]> {
        match self.dims.as_slice() {
            [d, h, w]    => Some([1, *d, *h, *w]),
            [c, d, h, w] => Some([*c, *d, *h, *w]),
            _            => None,
        }
    }

    /// Dims a batch tensor stacks this grid with. Non-volumetric
    /// ranks become one flat single-channel column.
    pub fn batch_dims(&self) -> [usize; 4] {
        self.channel_dims().unwrap_or([1, self.len(), 1, 1])
    }
}

/// One shape row as produced by a corpus source.
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub id:       String,
    pub voxels:   Arc<VoxelGrid>,
    pub category: String,
}

impl ShapeRecord {
    pub fn new(id: impl Into<String>, voxels: VoxelGrid, category: impl Into<String>) -> Self {
        Self {
            id:       id.into(),
            voxels:   Arc::new(voxels),
            category: category.into(),
        }
    }
}

/// A description before vectorization (straight from the labels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDescription {
    pub id:       String,
    pub text:     String,
    pub category: String,
}

impl RawDescription {
    pub fn new(
        id:       impl Into<String>,
        text:     impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id:       id.into(),
            text:     text.into(),
            category: category.into(),
        }
    }
}

/// A description after vectorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRecord {
    pub id:       String,
    pub text:     String,
    /// Fixed-length token ids, zero padded
    pub tokens:   Vec<u32>,
    pub category: String,
}

/// Everything a corpus source hands to the data layer.
#[derive(Debug, Clone, Default)]
pub struct RawCorpus {
    pub shapes:       Vec<ShapeRecord>,
    pub descriptions: Vec<RawDescription>,
}
