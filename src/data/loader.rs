// ============================================================
// Layer 4 — Corpus Loaders
// ============================================================
// Two on-disk layouts are supported.
//
// ShapeNet:
//   labels CSV    one row per description
//                 (modelId, description, category, …)
//   data dir      <modelId>.nrrd voxel files, any depth
//
//   A shape's category is the category of the first
//   description row with the same modelId, or "none".
//
// Primitives:
//   root/
//     cube-red/            ← one folder per primitive group
//       cube-red-0.nrrd
//       cube-red-1.nrrd
//       descriptions.txt   ← one description per line
//     sphere-blue/
//       …
//
//   Categories come from the shape name: "shape" uses the
//   first '-' separated part, "shape_color" the first two.
//   Every description of a folder is attached to a random
//   shape of that same folder, so shapes share descriptions.
//
// Unreadable shape files are fatal: a half-loaded corpus
// would silently change the split. So is a shape whose grid
// dims differ from the first file read, since batches stack
// grids into one tensor.
//
// Reference: walkdir / csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::records::{RawCorpus, RawDescription, ShapeRecord, VoxelGrid, CATEGORY_NONE};
use crate::domain::traits::CorpusSource;
use crate::infra::nrrd::read_nrrd;

const SHAPE_EXTENSION:       &str = "nrrd";
const DESCRIPTION_EXTENSION: &str = "txt";

/// How primitives categories are derived from shape names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Categorize {
    /// "cube-red-3" → "cube"
    Shape,
    /// "cube-red-3" → "cube red"
    ShapeColor,
}

impl Categorize {
    pub fn category_of(self, name: &str) -> String {
        let mut parts = name.split('-');
        let shape     = parts.next().unwrap_or(name);
        match (self, parts.next()) {
            (Categorize::ShapeColor, Some(color)) => format!("{shape} {color}"),
            _                                      => shape.to_string(),
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("File name of '{}' is not valid UTF-8", path.display()))
}

/// Grid dims of the first shape file, checked against every later one.
#[derive(Default)]
struct GridDims {
    first: Option<([usize; 4], PathBuf)>,
}

impl GridDims {
    fn check(&mut self, path: &Path, grid: &VoxelGrid) -> Result<()> {
        let dims = grid.batch_dims();
        if let Some((expected, origin)) = &self.first {
            if *expected != dims {
                bail!(
                    "Shape '{}' has grid dims {:?} but '{}' has {:?}; all shapes must share one size",
                    path.display(),
                    dims,
                    origin.display(),
                    expected
                );
            }
            return Ok(());
        }
        self.first = Some((dims, path.to_path_buf()));
        Ok(())
    }
}

// ─── ShapeNet ─────────────────────────────────────────────────────────────────

/// One labels CSV row; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct LabelRow {
    #[serde(rename = "modelId")]
    model_id:    String,
    description: String,
    category:    String,
}

pub struct ShapeNetSource {
    labels:   PathBuf,
    data_dir: PathBuf,
}

impl ShapeNetSource {
    pub fn new(labels: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            labels:   labels.into(),
            data_dir: data_dir.into(),
        }
    }

    fn load_labels(&self) -> Result<Vec<RawDescription>> {
        let mut reader = csv::Reader::from_path(&self.labels)
            .with_context(|| format!("Cannot load labels '{}'", self.labels.display()))?;

        let mut descriptions = Vec::new();
        for (line, row) in reader.deserialize::<LabelRow>().enumerate() {
            let row = row.with_context(|| {
                format!("Malformed labels row {} in '{}'", line + 1, self.labels.display())
            })?;
            descriptions.push(RawDescription::new(row.model_id, row.description, row.category));
        }
        Ok(descriptions)
    }
}

impl CorpusSource for ShapeNetSource {
    fn load(&self, _rng: &mut dyn RngCore) -> Result<RawCorpus> {
        let descriptions = self.load_labels()?;
        tracing::info!("Loaded {} descriptions from '{}'", descriptions.len(), self.labels.display());

        // first category seen per modelId
        let mut categories: HashMap<&str, &str> = HashMap::new();
        for d in &descriptions {
            categories.entry(d.id.as_str()).or_insert(d.category.as_str());
        }

        if !self.data_dir.is_dir() {
            bail!("Cannot load data directory '{}'", self.data_dir.display());
        }

        let mut shapes    = Vec::new();
        let mut grid_dims = GridDims::default();
        for entry in WalkDir::new(&self.data_dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Cannot walk '{}'", self.data_dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !has_extension(path, SHAPE_EXTENSION) {
                continue;
            }

            let id       = file_stem(path)?;
            let voxels   = read_nrrd(path)?;
            grid_dims.check(path, &voxels)?;
            let category = categories.get(id.as_str()).copied().unwrap_or(CATEGORY_NONE);
            shapes.push(ShapeRecord::new(id, voxels, category));

            if shapes.len() % 1000 == 0 {
                tracing::debug!("Parsed {} shapes", shapes.len());
            }
        }

        let uncategorised = shapes.iter().filter(|s| s.category == CATEGORY_NONE).count();
        if uncategorised > 0 {
            tracing::warn!("{} shapes have no description and category '{}'", uncategorised, CATEGORY_NONE);
        }
        tracing::info!("Loaded {} shapes from '{}'", shapes.len(), self.data_dir.display());

        Ok(RawCorpus { shapes, descriptions })
    }
}

// ─── Primitives ───────────────────────────────────────────────────────────────

pub struct PrimitivesSource {
    root:       PathBuf,
    categorize: Categorize,
}

impl PrimitivesSource {
    pub fn new(root: impl Into<PathBuf>, categorize: Categorize) -> Self {
        Self { root: root.into(), categorize }
    }

    /// First column of every row of a description file.
    fn read_descriptions(path: &Path) -> Result<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Cannot read descriptions '{}'", path.display()))?;

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Malformed description in '{}'", path.display()))?;
            if let Some(text) = record.get(0).filter(|t| !t.trim().is_empty()) {
                lines.push(text.to_string());
            }
        }
        Ok(lines)
    }

    /// Load one folder, attaching descriptions to its shapes.
    fn load_folder(
        &self,
        folder:    &Path,
        corpus:    &mut RawCorpus,
        grid_dims: &mut GridDims,
        rng:       &mut dyn RngCore,
    ) -> Result<()> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(folder)
            .with_context(|| format!("Cannot read directory '{}'", folder.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("Cannot list '{}'", folder.display()))?;
        files.sort();

        // shapes of this folder: (id, category)
        let mut members: Vec<(String, String)> = Vec::new();
        let mut texts:   Vec<String> = Vec::new();

        for path in files.iter().filter(|p| p.is_file()) {
            if has_extension(path, SHAPE_EXTENSION) {
                let id       = file_stem(path)?;
                let category = self.categorize.category_of(&id);
                let voxels   = read_nrrd(path)?;
                grid_dims.check(path, &voxels)?;
                corpus.shapes.push(ShapeRecord::new(id.clone(), voxels, category.clone()));
                members.push((id, category));
            } else if has_extension(path, DESCRIPTION_EXTENSION) {
                texts.extend(Self::read_descriptions(path)?);
            }
        }

        if members.is_empty() {
            if !texts.is_empty() {
                tracing::warn!(
                    "Skipping {} descriptions in '{}': folder has no shapes",
                    texts.len(),
                    folder.display()
                );
            }
            return Ok(());
        }

        for text in texts {
            let (id, category) = &members[rng.gen_range(0..members.len())];
            corpus.descriptions.push(RawDescription::new(id.clone(), text, category.clone()));
        }
        Ok(())
    }
}

impl CorpusSource for PrimitivesSource {
    fn load(&self, rng: &mut dyn RngCore) -> Result<RawCorpus> {
        if !self.root.is_dir() {
            bail!("Loader was not able to parse primitives directory '{}'", self.root.display());
        }

        let mut corpus    = RawCorpus::default();
        let mut grid_dims = GridDims::default();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Cannot walk '{}'", self.root.display()))?;
            if entry.file_type().is_dir() {
                self.load_folder(entry.path(), &mut corpus, &mut grid_dims, rng)?;
            }
        }

        tracing::info!(
            "Loaded {} primitive shapes and {} descriptions from '{}'",
            corpus.shapes.len(),
            corpus.descriptions.len(),
            self.root.display()
        );
        Ok(corpus)
    }
}
