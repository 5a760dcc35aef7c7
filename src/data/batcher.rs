// ============================================================
// Layer 4 — Triplet Batcher
// ============================================================
// Implements Burn's Batcher trait to turn sampled triplets
// into tensors a training loop can consume.
//
// Shapes:
//   voxels  [N, C, D, H, W]   float, one grid per triplet
//   tokens  [N, L]            int, fixed-length descriptions
//
// Rank-3 grids get a single channel. Every grid in a corpus
// shares the same dims (the corpus sources enforce it), as
// every description vector shares the same length.
//
//   Input:  Vec of N triplets
//   Output: three stacked tensors (anchor, positive, negative)
//
// The flatten-then-reshape approach is the same for both:
//   [t1_v1, …, t1_vK, t2_v1, …, tN_vK] → [N, …]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::records::VoxelGrid;
use crate::domain::triplet::{ShapeToTextTriplet, TextToShapeTriplet, TripletBatch};

// ─── Batch Types ──────────────────────────────────────────────────────────────

/// Shape anchors with matching and non-matching descriptions.
#[derive(Debug, Clone)]
pub struct ShapeToTextBatch<B: Backend> {
    /// [batch, channels, depth, height, width]
    pub shapes:         Tensor<B, 5>,
    /// [batch, description_length]
    pub positive_descs: Tensor<B, 2, Int>,
    pub negative_descs: Tensor<B, 2, Int>,
}

/// Description anchors with matching and non-matching shapes.
#[derive(Debug, Clone)]
pub struct TextToShapeBatch<B: Backend> {
    /// [batch, description_length]
    pub descs:           Tensor<B, 2, Int>,
    /// [batch, channels, depth, height, width]
    pub positive_shapes: Tensor<B, 5>,
    pub negative_shapes: Tensor<B, 5>,
}

/// Either direction, as produced from a TripletBatch.
#[derive(Debug, Clone)]
pub enum TensorBatch<B: Backend> {
    ShapeToText(ShapeToTextBatch<B>),
    TextToShape(TextToShapeBatch<B>),
}

// ─── TripletBatcher ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TripletBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TripletBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack a sampled batch of either direction.
    pub fn tensors(&self, batch: TripletBatch) -> TensorBatch<B> {
        match batch {
            TripletBatch::ShapeToText(items) => TensorBatch::ShapeToText(
                <Self as Batcher<_, ShapeToTextBatch<B>>>::batch(self, items),
            ),
            TripletBatch::TextToShape(items) => TensorBatch::TextToShape(
                <Self as Batcher<_, TextToShapeBatch<B>>>::batch(self, items),
            ),
        }
    }

    fn stack_tokens<'t>(&self, rows: impl Iterator<Item = &'t [u32]>) -> Tensor<B, 2, Int> {
        let mut count = 0;
        let mut flat: Vec<i32> = Vec::new();
        for row in rows {
            flat.extend(row.iter().map(|&t| t as i32));
            count += 1;
        }
        let length = if count == 0 { 0 } else { flat.len() / count };

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([count, length])
    }

    fn stack_voxels<'g>(&self, grids: impl Iterator<Item = &'g VoxelGrid>) -> Tensor<B, 5> {
        let mut count = 0;
        let mut dims  = [1, 0, 1, 1];
        let mut flat: Vec<f32> = Vec::new();
        for grid in grids {
            if count == 0 {
                dims = grid.batch_dims();
            }
            // corpus sources reject mixed grid sizes at load time
            debug_assert_eq!(grid.batch_dims(), dims, "voxel grids of one batch differ in dims");
            flat.extend_from_slice(&grid.values);
            count += 1;
        }
        let [c, d, h, w] = dims;

        Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([count, c, d, h, w])
    }
}

// ─── Burn Batcher Trait Implementations ───────────────────────────────────────

impl<B: Backend> Batcher<ShapeToTextTriplet, ShapeToTextBatch<B>> for TripletBatcher<B> {
    fn batch(&self, items: Vec<ShapeToTextTriplet>) -> ShapeToTextBatch<B> {
        ShapeToTextBatch {
            shapes:         self.stack_voxels(items.iter().map(|t| t.shape.as_ref())),
            positive_descs: self.stack_tokens(items.iter().map(|t| t.positive_desc.as_slice())),
            negative_descs: self.stack_tokens(items.iter().map(|t| t.negative_desc.as_slice())),
        }
    }
}

impl<B: Backend> Batcher<TextToShapeTriplet, TextToShapeBatch<B>> for TripletBatcher<B> {
    fn batch(&self, items: Vec<TextToShapeTriplet>) -> TextToShapeBatch<B> {
        TextToShapeBatch {
            descs:           self.stack_tokens(items.iter().map(|t| t.desc.as_slice())),
            positive_shapes: self.stack_voxels(items.iter().map(|t| t.positive_shape.as_ref())),
            negative_shapes: self.stack_voxels(items.iter().map(|t| t.negative_shape.as_ref())),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::triplet::TripletRows;
    use burn::backend::NdArray;
    use std::sync::Arc;

    type TestBackend = NdArray;

    fn grid(dims: Vec<usize>, fill: f32) -> Arc<VoxelGrid> {
        let len = dims.iter().product();
        Arc::new(VoxelGrid::new(dims, vec![fill; len]).unwrap())
    }

    fn rows() -> TripletRows {
        TripletRows { anchor: 0, positive: 1, negative: 2 }
    }

    #[test]
    fn test_shape_to_text_dims() {
        let items: Vec<ShapeToTextTriplet> = (0..3)
            .map(|i| ShapeToTextTriplet {
                shape:         grid(vec![4, 2, 3, 5], i as f32),
                positive_desc: vec![i, 2, 0, 0, 0, 0],
                negative_desc: vec![7, 0, 0, 0, 0, 0],
                rows:          rows(),
            })
            .collect();

        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        let batch: ShapeToTextBatch<TestBackend> = batcher.batch(items);

        assert_eq!(batch.shapes.dims(), [3, 4, 2, 3, 5]);
        assert_eq!(batch.positive_descs.dims(), [3, 6]);
        assert_eq!(batch.negative_descs.dims(), [3, 6]);
    }

    #[test]
    fn test_rank3_grids_get_one_channel() {
        let items = vec![TextToShapeTriplet {
            desc:           vec![5, 6, 0],
            positive_shape: grid(vec![2, 2, 2], 1.0),
            negative_shape: grid(vec![2, 2, 2], 0.0),
            rows:           rows(),
        }];

        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        let batch: TextToShapeBatch<TestBackend> = batcher.batch(items);

        assert_eq!(batch.descs.dims(), [1, 3]);
        assert_eq!(batch.positive_shapes.dims(), [1, 1, 2, 2, 2]);

        let sum: f32 = batch.positive_shapes.sum().into_scalar();
        assert_eq!(sum, 8.0);
    }

    #[test]
    #[should_panic(expected = "differ in dims")]
    fn test_mixed_grid_dims_are_caught() {
        let items = vec![
            ShapeToTextTriplet {
                shape:         grid(vec![2, 2, 2], 0.0),
                positive_desc: vec![1, 0],
                negative_desc: vec![2, 0],
                rows:          rows(),
            },
            ShapeToTextTriplet {
                shape:         grid(vec![3, 3, 3], 0.0),
                positive_desc: vec![1, 0],
                negative_desc: vec![2, 0],
                rows:          rows(),
            },
        ];

        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        let _batch: ShapeToTextBatch<TestBackend> = batcher.batch(items);
    }

    #[test]
    fn test_tensors_keeps_direction() {
        let batch = TripletBatch::TextToShape(vec![TextToShapeTriplet {
            desc:           vec![1, 0],
            positive_shape: grid(vec![1, 1, 1], 1.0),
            negative_shape: grid(vec![1, 1, 1], 0.0),
            rows:           rows(),
        }]);

        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        assert!(matches!(batcher.tensors(batch), TensorBatch::TextToShape(_)));
    }
}
