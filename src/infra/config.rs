// ============================================================
// Layer 6 — Loader Configuration
// ============================================================
// The run configuration is a JSON file, e.g.
//
//   {
//     "dataset": "primitives",
//     "directories": {
//       "vocabulary": "data/vocabulary.txt",
//       "primitives": "data/primitives"
//     },
//     "hyper_parameters": { "bs": 32, "oversample": 4 },
//     "categorize": "shape_color"
//   }
//
// Everything else has a default (seed 1200, 90/10 split,
// 96-token descriptions, 10 000 attempts per redraw loop).
//
// serde derives handle parsing; validate() rejects values
// the samplers cannot work with.
//
// Reference: serde / serde_json documentation
//            Rust Book §9 (Error Handling with anyhow)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::loader::Categorize;
use crate::data::sampler::DEFAULT_MAX_ATTEMPTS;
use crate::data::smart_batch::pool_size;
use crate::data::splitter::DEFAULT_TRAIN_FRACTION;
use crate::data::triplet_loader::LoaderSettings;

/// Which corpus layout to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Labels CSV + directory of .nrrd shapes
    Shapenet,
    /// One folder per primitive group, descriptions shared
    Primitives,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directories {
    #[serde(default)]
    pub train_labels: Option<PathBuf>,
    #[serde(default)]
    pub train_data:   Option<PathBuf>,
    #[serde(default)]
    pub vocabulary:   Option<PathBuf>,
    #[serde(default)]
    pub primitives:   Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperParameters {
    pub bs:         usize,
    pub oversample: usize,
}

fn default_categorize() -> Categorize {
    Categorize::Shape
}

fn default_seed() -> u64 {
    1200
}

fn default_train_fraction() -> f64 {
    DEFAULT_TRAIN_FRACTION
}

fn default_description_length() -> usize {
    96
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub dataset:          DatasetKind,
    pub directories:      Directories,
    pub hyper_parameters: HyperParameters,

    #[serde(default = "default_categorize")]
    pub categorize: Categorize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,

    /// Fixed length of every description token vector
    #[serde(default = "default_description_length")]
    pub description_length: usize,

    /// Cap on redraws in any single rejection loop
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl LoaderConfig {
    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw  = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        let config: LoaderConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Cannot parse config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hyper_parameters.bs == 0 {
            bail!("hyper_parameters.bs must be at least 1");
        }
        if self.hyper_parameters.oversample == 0 {
            bail!("hyper_parameters.oversample must be at least 1");
        }
        pool_size(self.hyper_parameters.bs, self.hyper_parameters.oversample)
            .context("hyper_parameters.bs * hyper_parameters.oversample is too large")?;
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            bail!("train_fraction must lie strictly between 0 and 1, got {}", self.train_fraction);
        }
        if self.description_length == 0 {
            bail!("description_length must be at least 1");
        }
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Path that must be present for this run, or a descriptive error.
    pub fn require_dir<'a>(&self, value: &'a Option<PathBuf>, name: &str) -> Result<&'a Path> {
        value
            .as_deref()
            .with_context(|| format!("directories.{name} is required for dataset {:?}", self.dataset))
    }

    /// Sampling settings for a TripletLoader
    pub fn loader_settings(&self, vocabulary_size: usize) -> LoaderSettings {
        LoaderSettings {
            batch_size:     self.hyper_parameters.bs,
            oversample:     self.hyper_parameters.oversample,
            seed:           self.seed,
            train_fraction: self.train_fraction,
            max_attempts:   self.max_attempts,
            vocabulary_size,
        }
    }
}
