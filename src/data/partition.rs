// ============================================================
// Layer 4 — Partition
// ============================================================
// A partition is one half of the train/test split (or the
// whole corpus for retrieval evaluation). It bundles:
//
//   shapes / descriptions   the two corpus tables
//   MatchIndex per table    identifier → rows, for positives
//   category counts         rows per category, for negatives
//
// Tables are immutable once a partition is built, so the
// indices never go stale.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::match_index::MatchIndex;
use crate::data::table::{Corpus, CorpusTable, DescriptionTable, ShapeTable};
use crate::domain::records::VoxelGrid;

/// Row counts per category for one table.
#[derive(Debug, Clone, Default)]
pub struct CategoryCounts {
    counts: HashMap<String, usize>,
    total:  usize,
}

impl CategoryCounts {
    pub fn build(categories: &[String]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for category in categories {
            *counts.entry(category.clone()).or_insert(0) += 1;
        }
        Self { counts, total: categories.len() }
    }

    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Rows whose category differs from `category`
    pub fn outside(&self, category: &str) -> usize {
        self.total - self.count(category)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// (category, rows) sorted by category name
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut pairs: Vec<(&str, usize)> =
            self.counts.iter().map(|(c, n)| (c.as_str(), *n)).collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct Partition {
    name:                   String,
    shapes:                 ShapeTable,
    descriptions:           DescriptionTable,
    shape_index:            MatchIndex,
    description_index:      MatchIndex,
    shape_categories:       CategoryCounts,
    description_categories: CategoryCounts,
}

impl Partition {
    pub fn new(
        name:         impl Into<String>,
        shapes:       ShapeTable,
        descriptions: DescriptionTable,
    ) -> Self {
        Self {
            name:                   name.into(),
            shape_index:            MatchIndex::build(shapes.ids()),
            description_index:      MatchIndex::build(descriptions.ids()),
            shape_categories:       CategoryCounts::build(shapes.categories()),
            description_categories: CategoryCounts::build(descriptions.categories()),
            shapes,
            descriptions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    pub fn descriptions(&self) -> &DescriptionTable {
        &self.descriptions
    }

    pub fn shape_len(&self) -> usize {
        self.shapes.len()
    }

    pub fn description_len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn shape_index(&self) -> &MatchIndex {
        &self.shape_index
    }

    pub fn description_index(&self) -> &MatchIndex {
        &self.description_index
    }

    pub fn shape_categories(&self) -> &CategoryCounts {
        &self.shape_categories
    }

    pub fn description_categories(&self) -> &CategoryCounts {
        &self.description_categories
    }

    /// Voxel grid of one shape row
    pub fn shape(&self, row: usize) -> Arc<VoxelGrid> {
        self.shapes.voxel(row)
    }

    /// Token vector of one description row
    pub fn description(&self, row: usize) -> &[u32] {
        self.descriptions.tokens(row)
    }
}

impl Corpus {
    /// Wrap the whole corpus as a single partition, for
    /// retrieval evaluation over all data.
    pub fn into_partition(self, name: impl Into<String>) -> Partition {
        Partition::new(name, self.shapes, self.descriptions)
    }
}
