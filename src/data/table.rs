// ============================================================
// Layer 4 — Corpus Tables
// ============================================================
// Columnar (struct-of-arrays) storage for the two modalities.
//
//   ShapeTable        ids | voxels | categories
//   DescriptionTable  ids | texts  | tokens | categories
//
// Row i across every column is the same record. Columns are
// private and only grow through push(), so all columns of a
// table always have equal length.
//
// Identifiers are NOT unique: one shape id can appear on many
// description rows, and primitives data may repeat shape ids.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SliceRandom)

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::domain::records::{
    DescriptionRecord, RawCorpus, RawDescription, ShapeRecord, VoxelGrid,
};
use crate::domain::traits::Vectorizer;

// ─── CorpusTable ──────────────────────────────────────────────────────────────
/// Operations shared by both tables. The split and the matching
/// index only need identifiers, categories and row selection.
pub trait CorpusTable: Sized {
    /// Number of rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier column
    fn ids(&self) -> &[String];

    /// Category column
    fn categories(&self) -> &[String];

    /// New table holding `rows` in the given order (rows may repeat).
    fn select(&self, rows: &[usize]) -> Self;

    /// Permute every column with the same random permutation.
    fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        *self = self.select(&order);
    }

    /// Contiguous row range as a new table
    fn slice(&self, range: std::ops::Range<usize>) -> Self {
        let rows: Vec<usize> = range.collect();
        self.select(&rows)
    }
}

// ─── ShapeTable ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    ids:        Vec<String>,
    voxels:     Vec<Arc<VoxelGrid>>,
    categories: Vec<String>,
}

impl ShapeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ShapeRecord) {
        self.ids.push(record.id);
        self.voxels.push(record.voxels);
        self.categories.push(record.category);
    }

    /// Shared handle to one row's voxel grid
    pub fn voxel(&self, row: usize) -> Arc<VoxelGrid> {
        Arc::clone(&self.voxels[row])
    }

    /// Reassemble one row as a record
    pub fn record(&self, row: usize) -> ShapeRecord {
        ShapeRecord {
            id:       self.ids[row].clone(),
            voxels:   self.voxel(row),
            category: self.categories[row].clone(),
        }
    }
}

impl FromIterator<ShapeRecord> for ShapeTable {
    fn from_iter<I: IntoIterator<Item = ShapeRecord>>(iter: I) -> Self {
        let mut table = ShapeTable::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}

impl CorpusTable for ShapeTable {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn ids(&self) -> &[String] {
        &self.ids
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn select(&self, rows: &[usize]) -> Self {
        rows.iter().map(|&row| self.record(row)).collect()
    }
}

// ─── DescriptionTable ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct DescriptionTable {
    ids:        Vec<String>,
    texts:      Vec<String>,
    tokens:     Vec<Vec<u32>>,
    categories: Vec<String>,
}

impl DescriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DescriptionRecord) {
        self.ids.push(record.id);
        self.texts.push(record.text);
        self.tokens.push(record.tokens);
        self.categories.push(record.category);
    }

    /// Vectorize raw descriptions in order. The first description
    /// that fails to vectorize aborts the whole table.
    pub fn from_raw(raw: Vec<RawDescription>, vectorizer: &dyn Vectorizer) -> Result<Self> {
        raw.into_iter()
            .map(|d| -> Result<DescriptionRecord> {
                let tokens = vectorizer
                    .description_to_vector(&d.text)
                    .with_context(|| format!("Cannot vectorize description of '{}'", d.id))?;
                Ok(DescriptionRecord {
                    tokens,
                    id:       d.id,
                    text:     d.text,
                    category: d.category,
                })
            })
            .collect()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Token id vector of one row
    pub fn tokens(&self, row: usize) -> &[u32] {
        &self.tokens[row]
    }

    pub fn record(&self, row: usize) -> DescriptionRecord {
        DescriptionRecord {
            id:       self.ids[row].clone(),
            text:     self.texts[row].clone(),
            tokens:   self.tokens[row].clone(),
            category: self.categories[row].clone(),
        }
    }
}

impl FromIterator<DescriptionRecord> for DescriptionTable {
    fn from_iter<I: IntoIterator<Item = DescriptionRecord>>(iter: I) -> Self {
        let mut table = DescriptionTable::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}

impl CorpusTable for DescriptionTable {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn ids(&self) -> &[String] {
        &self.ids
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn select(&self, rows: &[usize]) -> Self {
        rows.iter().map(|&row| self.record(row)).collect()
    }
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
/// Both tables of a loaded dataset, before splitting.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub shapes:       ShapeTable,
    pub descriptions: DescriptionTable,
}

impl Corpus {
    pub fn new(shapes: ShapeTable, descriptions: DescriptionTable) -> Self {
        Self { shapes, descriptions }
    }

    /// Build tables from a raw corpus, vectorizing every
    /// description exactly once.
    pub fn from_raw(raw: RawCorpus, vectorizer: &dyn Vectorizer) -> Result<Self> {
        let shapes: ShapeTable = raw.shapes.into_iter().collect();
        let descriptions = DescriptionTable::from_raw(raw.descriptions, vectorizer)?;

        tracing::debug!(
            "Corpus tables built: {} shapes, {} descriptions",
            shapes.len(),
            descriptions.len()
        );

        Ok(Self { shapes, descriptions })
    }

    /// Shuffle both tables independently (used for sorted
    /// primitives data).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shapes.shuffle(rng);
        self.descriptions.shuffle(rng);
    }
}
