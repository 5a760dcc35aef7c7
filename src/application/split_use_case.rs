// ============================================================
// Layer 2 — SplitUseCase
// ============================================================
// Loads the configured corpus, splits it and reports what
// each half holds:
//
//   Step 1: Prepare corpus             (application/corpus)
//   Step 2: Split on the shape axis    (Layer 4 - data)
//   Step 3: Summarise both partitions and the whole corpus
//
// Useful to check a config before training, e.g. whether the
// test half has more than one category to draw negatives from.

use anyhow::Result;

use crate::application::corpus::prepare_corpus;
use crate::data::partition::Partition;
use crate::data::table::CorpusTable;
use crate::data::splitter::split_train_test;
use crate::infra::config::LoaderConfig;

/// Sizes and category counts of one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionReport {
    pub name:         String,
    pub shapes:       usize,
    pub descriptions: usize,
    pub identifiers:  usize,
    /// (category, shape rows), sorted by category
    pub categories:   Vec<(String, usize)>,
}

impl PartitionReport {
    fn of(partition: &Partition) -> Self {
        Self {
            name:         partition.name().to_string(),
            shapes:       partition.shape_len(),
            descriptions: partition.description_len(),
            identifiers:  partition.shape_index().distinct_ids(),
            categories:   partition
                .shape_categories()
                .sorted()
                .into_iter()
                .map(|(c, n)| (c.to_string(), n))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitReport {
    pub vocabulary_size: usize,
    pub train:           PartitionReport,
    pub test:            PartitionReport,
    /// The unsplit corpus as one partition
    pub corpus:          PartitionReport,
}

pub struct SplitUseCase {
    config: LoaderConfig,
}

impl SplitUseCase {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SplitReport> {
        let prepared = prepare_corpus(&self.config)?;
        tracing::info!(
            "Corpus: {} shapes, {} descriptions",
            prepared.corpus.shapes.len(),
            prepared.corpus.descriptions.len()
        );

        let (train, test) = split_train_test(&prepared.corpus, self.config.train_fraction);

        for partition in [&train, &test] {
            let single = partition.shape_categories().distinct() < 2;
            if single && partition.shape_len() > 0 {
                tracing::warn!(
                    "Partition '{}' has a single category; negatives cannot be drawn from it",
                    partition.name()
                );
            }
        }

        let all = prepared.corpus.into_partition("all");

        Ok(SplitReport {
            vocabulary_size: prepared.vocabulary_size,
            train:           PartitionReport::of(&train),
            test:            PartitionReport::of(&test),
            corpus:          PartitionReport::of(&all),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::corpus::tests::primitives_fixture;

    #[test]
    fn test_split_report_counts() {
        let dir    = tempfile::tempdir().unwrap();
        let config = LoaderConfig::from_file(primitives_fixture(dir.path(), 4)).unwrap();

        let report = SplitUseCase::new(config).execute().unwrap();
        assert_eq!(report.vocabulary_size, 14);
        assert_eq!(report.train.shapes + report.test.shapes, 12);
        assert_eq!(report.train.name, "train");

        // every primitive shape has its own identifier
        assert_eq!(report.train.identifiers, report.train.shapes);

        let train_total: usize = report.train.categories.iter().map(|(_, n)| n).sum();
        assert_eq!(train_total, report.train.shapes);
        assert!(report.train.categories.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_split_report_covers_whole_corpus() {
        let dir    = tempfile::tempdir().unwrap();
        let config = LoaderConfig::from_file(primitives_fixture(dir.path(), 4)).unwrap();

        let report = SplitUseCase::new(config).execute().unwrap();
        assert_eq!(report.corpus.name, "all");
        assert_eq!(report.corpus.shapes, 12);
        assert_eq!(report.corpus.descriptions, 12);
        assert_eq!(report.corpus.identifiers, 12);
        assert_eq!(
            report.corpus.categories,
            vec![
                ("cone".to_string(), 3),
                ("cube".to_string(), 3),
                ("sphere".to_string(), 3),
                ("torus".to_string(), 3),
            ]
        );
    }
}
