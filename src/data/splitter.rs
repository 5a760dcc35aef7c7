// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Splits a corpus into a training partition and a test
// partition without leaking identifiers across the split.
//
// The split runs on the SHAPE axis first:
//   - the first floor(fraction * N) shape rows become train
//   - every later row whose identifier already appears in
//     train is kept in train as well (primitives data can
//     repeat a shape id)
//   - the remaining rows become test
//
// Descriptions then follow their shapes: for each DISTINCT
// identifier in a half (in first-seen order), every matching
// description row is copied across once. Descriptions whose
// identifier matches no shape in a half are dropped from it.
//
// The split itself is deterministic. Shuffling, where wanted,
// is done by the corpus loader before splitting.
//
// Split ratio: 90% training, 10% test (configurable)
//
// Reference: Rust Book §8 (Vectors, Hash Sets)

use std::collections::HashSet;

use crate::data::match_index::MatchIndex;
use crate::data::partition::Partition;
use crate::data::table::{Corpus, CorpusTable};

/// Default share of shapes that goes to training
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.9;

/// Split `corpus` into (train, test) partitions.
///
/// # Arguments
/// * `corpus`         - Loaded shape and description tables
/// * `train_fraction` - Proportion of shape rows for training, e.g. 0.9
///
/// # Example
/// ```
/// use shape_text_triplets::data::{splitter::split_train_test, table::Corpus};
/// let (train, test) = split_train_test(&Corpus::default(), 0.9);
/// assert_eq!(train.shape_len() + test.shape_len(), 0);
/// ```
pub fn split_train_test(corpus: &Corpus, train_fraction: f64) -> (Partition, Partition) {
    let shape_ids = corpus.shapes.ids();
    let total     = shape_ids.len();

    // floor(), then clamp so tiny corpora never index out of range
    let boundary = ((total as f64) * train_fraction).floor() as usize;
    let boundary = boundary.min(total);

    let mut train_rows: Vec<usize> = (0..boundary).collect();
    let mut test_rows:  Vec<usize> = Vec::with_capacity(total - boundary);

    let train_ids: HashSet<&str> = shape_ids[..boundary].iter().map(String::as_str).collect();
    for (row, id) in shape_ids.iter().enumerate().skip(boundary) {
        if train_ids.contains(id.as_str()) {
            train_rows.push(row);
        } else {
            test_rows.push(row);
        }
    }

    let moved = train_rows.len() - boundary;
    if moved > 0 {
        tracing::debug!("Kept {} shape rows in train to avoid identifier leakage", moved);
    }

    let description_index = MatchIndex::build(corpus.descriptions.ids());

    let train = build_partition("train", corpus, &train_rows, &description_index);
    let test  = build_partition("test",  corpus, &test_rows,  &description_index);

    tracing::info!(
        "Split: {} train shapes / {} descriptions, {} test shapes / {} descriptions",
        train.shape_len(),
        train.description_len(),
        test.shape_len(),
        test.description_len(),
    );

    (train, test)
}

/// Select shape rows, then carry over the matching
/// descriptions once per distinct identifier.
fn build_partition(
    name:              &str,
    corpus:            &Corpus,
    shape_rows:        &[usize],
    description_index: &MatchIndex,
) -> Partition {
    let shapes = corpus.shapes.select(shape_rows);

    let mut seen             = HashSet::new();
    let mut description_rows = Vec::new();
    for id in shapes.ids() {
        if seen.insert(id.as_str()) {
            description_rows.extend_from_slice(description_index.positions(id));
        }
    }

    let descriptions = corpus.descriptions.select(&description_rows);
    Partition::new(name, shapes, descriptions)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{DescriptionTable, ShapeTable};
    use crate::domain::records::{DescriptionRecord, ShapeRecord, VoxelGrid};

    fn corpus(shape_ids: &[&str], desc_ids: &[&str]) -> Corpus {
        let grid = VoxelGrid::new(vec![1, 1, 1], vec![0.0]).unwrap();
        let shapes: ShapeTable = shape_ids
            .iter()
            .map(|id| ShapeRecord::new(*id, grid.clone(), "cat"))
            .collect();
        let descriptions: DescriptionTable = desc_ids
            .iter()
            .enumerate()
            .map(|(i, id)| DescriptionRecord {
                id:       id.to_string(),
                text:     format!("desc {i}"),
                tokens:   vec![i as u32 + 1],
                category: "cat".into(),
            })
            .collect();
        Corpus::new(shapes, descriptions)
    }

    fn id_set(ids: &[String]) -> HashSet<&str> {
        ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_correct_split_sizes() {
        let ids: Vec<String> = (0..100).map(|i| format!("s{i}")).collect();
        let ids: Vec<&str>   = ids.iter().map(String::as_str).collect();
        let (train, test)    = split_train_test(&corpus(&ids, &[]), 0.9);
        assert_eq!(train.shape_len(), 90);
        assert_eq!(test.shape_len(),  10);
    }

    #[test]
    fn test_floor_is_used_for_boundary() {
        // 7 * 0.9 = 6.3 → 6 training rows
        let (train, test) = split_train_test(
            &corpus(&["a", "b", "c", "d", "e", "f", "g"], &[]),
            0.9,
        );
        assert_eq!(train.shape_len(), 6);
        assert_eq!(test.shape_len(),  1);
    }

    #[test]
    fn test_descriptions_follow_their_shapes() {
        let c = corpus(
            &["a", "b", "c", "d"],
            &["d", "a", "x", "a", "c", "b"],
        );
        let (train, test) = split_train_test(&c, 0.5);

        // train shapes a, b → descriptions of a (rows 1, 3) then b (row 5)
        assert_eq!(train.descriptions().ids(), &["a", "a", "b"]);
        assert_eq!(train.descriptions().texts(), &["desc 1", "desc 3", "desc 5"]);

        // test shapes c, d → "x" matches nothing and is dropped
        assert_eq!(test.descriptions().ids(), &["c", "d"]);
    }

    #[test]
    fn test_repeated_ids_copy_descriptions_once() {
        let c = corpus(&["a", "a", "a", "b"], &["a", "b", "a"]);
        let (train, _) = split_train_test(&c, 1.0);
        assert_eq!(train.shape_len(), 4);
        assert_eq!(train.descriptions().ids(), &["a", "a", "b"]);
    }

    #[test]
    fn test_no_identifier_leaks_across_split() {
        // "b" straddles the 50% boundary
        let c = corpus(&["a", "b", "b", "c"], &["a", "b", "c"]);
        let (train, test) = split_train_test(&c, 0.5);

        assert_eq!(train.shape_len() + test.shape_len(), 4);
        let train_ids = id_set(train.shapes().ids());
        let test_ids  = id_set(test.shapes().ids());
        assert!(train_ids.is_disjoint(&test_ids));
        assert_eq!(test.shapes().ids(), &["c"]);
    }

    #[test]
    fn test_empty_corpus() {
        let (train, test) = split_train_test(&Corpus::default(), 0.9);
        assert_eq!(train.shape_len(), 0);
        assert_eq!(test.shape_len(),  0);
        assert_eq!(train.description_len(), 0);
    }

    #[test]
    fn test_full_training_split() {
        let (train, test) = split_train_test(&corpus(&["a", "b"], &["a", "b"]), 1.0);
        assert_eq!(train.shape_len(), 2);
        assert_eq!(test.shape_len(),  0);
        assert_eq!(test.description_len(), 0);
    }
}
