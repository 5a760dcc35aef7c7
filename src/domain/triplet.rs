// ============================================================
// Layer 3 — Triplet Domain Types
// ============================================================
// A triplet is the unit of metric-learning supervision:
//
//   anchor    — the example a counterpart is sought for
//   positive  — same identifier, other modality
//   negative  — a counterpart that should NOT match the anchor
//
// Two retrieval directions exist:
//
//   Shape → Text   anchor shape,       positive/negative descriptions
//   Text  → Shape  anchor description, positive/negative shapes
//
// Every triplet also remembers which partition rows it was
// built from, so callers (and tests) can check identifiers
// and categories without comparing voxel payloads.
//
// Reference: Schroff et al. (2015) - FaceNet triplet loss
//            Rust Book §6 (Enums)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::domain::records::VoxelGrid;

/// Which retrieval direction a batch trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Direction {
    /// Shape anchor, description counterparts
    #[serde(rename = "s2t")]
    #[value(name = "s2t")]
    ShapeToText,

    /// Description anchor, shape counterparts
    #[serde(rename = "t2s")]
    #[value(name = "t2s")]
    TextToShape,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ShapeToText => write!(f, "s2t"),
            Direction::TextToShape => write!(f, "t2s"),
        }
    }
}

/// Which half of the train/test split to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    Train,
    Test,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitKind::Train => write!(f, "train"),
            SplitKind::Test  => write!(f, "test"),
        }
    }
}

/// Partition row positions a triplet was assembled from.
///
/// For Shape → Text, `anchor` is a shape row and `positive` /
/// `negative` are description rows. Text → Shape is the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletRows {
    pub anchor:   usize,
    pub positive: usize,
    pub negative: usize,
}

/// Anchor shape with a matching and a non-matching description.
#[derive(Debug, Clone)]
pub struct ShapeToTextTriplet {
    pub shape:         Arc<VoxelGrid>,
    pub positive_desc: Vec<u32>,
    pub negative_desc: Vec<u32>,
    pub rows:          TripletRows,
}

/// Anchor description with a matching and a non-matching shape.
#[derive(Debug, Clone)]
pub struct TextToShapeTriplet {
    pub desc:           Vec<u32>,
    pub positive_shape: Arc<VoxelGrid>,
    pub negative_shape: Arc<VoxelGrid>,
    pub rows:           TripletRows,
}

/// A batch of triplets for one direction.
#[derive(Debug, Clone)]
pub enum TripletBatch {
    ShapeToText(Vec<ShapeToTextTriplet>),
    TextToShape(Vec<TextToShapeTriplet>),
}

impl TripletBatch {
    pub fn len(&self) -> usize {
        match self {
            TripletBatch::ShapeToText(items) => items.len(),
            TripletBatch::TextToShape(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direction(&self) -> Direction {
        match self {
            TripletBatch::ShapeToText(_) => Direction::ShapeToText,
            TripletBatch::TextToShape(_) => Direction::TextToShape,
        }
    }

    /// Row positions of every triplet, in batch order
    pub fn rows(&self) -> Vec<TripletRows> {
        match self {
            TripletBatch::ShapeToText(items) => items.iter().map(|t| t.rows).collect(),
            TripletBatch::TextToShape(items) => items.iter().map(|t| t.rows).collect(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serde_names() {
        let s2t: Direction = serde_json::from_str("\"s2t\"").unwrap();
        let t2s: Direction = serde_json::from_str("\"t2s\"").unwrap();
        assert_eq!(s2t, Direction::ShapeToText);
        assert_eq!(t2s, Direction::TextToShape);
        assert_eq!(s2t.to_string(), "s2t");
    }

    #[test]
    fn test_batch_reports_direction_and_rows() {
        let grid = Arc::new(VoxelGrid::new(vec![1, 1, 1], vec![1.0]).unwrap());
        let rows = TripletRows { anchor: 3, positive: 1, negative: 2 };
        let batch = TripletBatch::TextToShape(vec![TextToShapeTriplet {
            desc:           vec![4, 5, 0],
            positive_shape: grid.clone(),
            negative_shape: grid,
            rows,
        }]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.direction(), Direction::TextToShape);
        assert_eq!(batch.rows(), vec![rows]);
    }
}
