// ============================================================
// Layer 2 — Corpus Preparation
// ============================================================
// Every command starts the same way:
//
//   Step 1: Load the vocabulary        (Layer 6 - infra)
//   Step 2: Pick the corpus source     (Layer 4 - data)
//   Step 3: Read shapes/descriptions   (Layer 4 - data)
//   Step 4: Vectorize descriptions     (Layer 4 - data)
//   Step 5: Shuffle primitives tables  (Layer 4 - data)
//
// The loading generator is seeded from the config seed, so a
// given config always yields the same corpus.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::loader::{PrimitivesSource, ShapeNetSource};
use crate::data::table::Corpus;
use crate::domain::traits::{CorpusSource, Vectorizer};
use crate::infra::config::{DatasetKind, LoaderConfig};
use crate::infra::vectorizer::VocabularyVectorizer;

/// A vectorized corpus and the vocabulary size it was built with.
pub struct PreparedCorpus {
    pub corpus:          Corpus,
    pub vocabulary_size: usize,
}

pub fn prepare_corpus(config: &LoaderConfig) -> Result<PreparedCorpus> {
    let dirs = &config.directories;

    // ── Step 1: Vocabulary ────────────────────────────────────────────────────
    let vocabulary = config.require_dir(&dirs.vocabulary, "vocabulary")?;
    let vectorizer = VocabularyVectorizer::from_file(vocabulary, config.description_length)?;

    // ── Step 2: Source ────────────────────────────────────────────────────────
    let source: Box<dyn CorpusSource> = match config.dataset {
        DatasetKind::Shapenet => Box::new(ShapeNetSource::new(
            config.require_dir(&dirs.train_labels, "train_labels")?,
            config.require_dir(&dirs.train_data, "train_data")?,
        )),
        DatasetKind::Primitives => Box::new(PrimitivesSource::new(
            config.require_dir(&dirs.primitives, "primitives")?,
            config.categorize,
        )),
    };

    // ── Steps 3-4: Load and vectorize ─────────────────────────────────────────
    let mut rng  = StdRng::seed_from_u64(config.seed);
    let raw      = source.load(&mut rng)?;
    let mut corpus = Corpus::from_raw(raw, &vectorizer)?;

    // ── Step 5: Primitives groups are stored folder by folder ─────────────────
    if config.dataset == DatasetKind::Primitives {
        corpus.shuffle(&mut rng);
        tracing::debug!("Shuffled primitives corpus");
    }

    Ok(PreparedCorpus {
        corpus,
        vocabulary_size: vectorizer.vocabulary_size(),
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::table::CorpusTable;
    use std::fs;
    use std::path::Path;

    fn write_nrrd(path: &Path, value: u8) {
        let mut bytes = b"NRRD0004\ntype: uint8\ndimension: 3\nsizes: 2 2 2\nencoding: raw\n\n".to_vec();
        bytes.extend_from_slice(&[value; 8]);
        fs::write(path, bytes).unwrap();
    }

    /// Primitives corpus on disk with four groups of three shapes,
    /// plus a config pointing at it. Returns the config path.
    pub(crate) fn primitives_fixture(root: &Path, bs: usize) -> std::path::PathBuf {
        let groups = [("cube", "red"), ("sphere", "blue"), ("cone", "green"), ("torus", "gold")];
        for (g, (shape, color)) in groups.iter().enumerate() {
            let folder = root.join("primitives").join(format!("{shape}-{color}"));
            fs::create_dir_all(&folder).unwrap();
            for i in 0..3 {
                write_nrrd(&folder.join(format!("{shape}-{color}-{i}.nrrd")), g as u8);
            }
            fs::write(
                folder.join("descriptions.txt"),
                format!("a {color} {shape}\na small {color} {shape}\nthe {shape} is {color}\n"),
            )
            .unwrap();
        }

        let vocabulary = root.join("vocabulary.txt");
        fs::write(&vocabulary, "a\nsmall\nthe\nis\ncube\nsphere\ncone\ntorus\nred\nblue\ngreen\ngold\n").unwrap();

        let config = root.join("config.json");
        let json = serde_json::json!({
            "dataset": "primitives",
            "directories": {
                "vocabulary": vocabulary,
                "primitives": root.join("primitives"),
            },
            "hyper_parameters": { "bs": bs, "oversample": 2 },
            "train_fraction": 0.75,
            "description_length": 6,
        });
        fs::write(&config, json.to_string()).unwrap();
        config
    }

    #[test]
    fn test_prepare_primitives_corpus() {
        let dir    = tempfile::tempdir().unwrap();
        let path   = primitives_fixture(dir.path(), 4);
        let config = LoaderConfig::from_file(path).unwrap();

        let prepared = prepare_corpus(&config).unwrap();
        assert_eq!(prepared.vocabulary_size, 14);
        assert_eq!(prepared.corpus.shapes.len(), 12);
        assert_eq!(prepared.corpus.descriptions.len(), 12);
        assert!(prepared.corpus.descriptions.ids().iter().all(|id| {
            prepared.corpus.shapes.ids().contains(id)
        }));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let dir    = tempfile::tempdir().unwrap();
        let config = LoaderConfig::from_file(primitives_fixture(dir.path(), 4)).unwrap();

        let a = prepare_corpus(&config).unwrap();
        let b = prepare_corpus(&config).unwrap();
        assert_eq!(a.corpus.shapes.ids(), b.corpus.shapes.ids());
        assert_eq!(a.corpus.descriptions.ids(), b.corpus.descriptions.ids());
    }

    #[test]
    fn test_missing_directory_entry() {
        let dir    = tempfile::tempdir().unwrap();
        let mut config = LoaderConfig::from_file(primitives_fixture(dir.path(), 4)).unwrap();
        config.directories.primitives = None;

        let err = prepare_corpus(&config).err().unwrap();
        assert!(err.to_string().contains("directories.primitives"));
    }
}
