// ============================================================
// Layer 4 — Match Index (positive lookup)
// ============================================================
// Answers "which rows of this table carry identifier X?".
//
// A positive counterpart shares the anchor's identifier, so
// positive lookup is:
//
//   1. find every row whose identifier equals the anchor's
//   2. pick one of them uniformly at random
//   3. or report None when there is no match
//
// The rows for each identifier are collected once per table
// into a hash multimap. Positions are stored in ascending row
// order, so a given RNG state always picks the same row.
//
// Reference: Rust Book §8 (Hash Maps)

use rand::Rng;
use std::collections::HashMap;

/// Identifier → ascending list of row positions.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    rows: HashMap<String, Vec<usize>>,
}

impl MatchIndex {
    /// Index an identifier column.
    pub fn build(ids: &[String]) -> Self {
        let mut rows: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, id) in ids.iter().enumerate() {
            rows.entry(id.clone()).or_default().push(row);
        }
        Self { rows }
    }

    /// Every row carrying `id` (empty when none)
    pub fn positions(&self, id: &str) -> &[usize] {
        self.rows.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Number of distinct identifiers
    pub fn distinct_ids(&self) -> usize {
        self.rows.len()
    }

    /// One matching row chosen uniformly at random, or None.
    pub fn choose<R: Rng + ?Sized>(&self, id: &str, rng: &mut R) -> Option<usize> {
        let matches = self.positions(id);
        if matches.is_empty() {
            return None;
        }
        Some(matches[rng.gen_range(0..matches.len())])
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positions_in_row_order() {
        let index = MatchIndex::build(&ids(&["a", "b", "a", "c", "a"]));
        assert_eq!(index.positions("a"), &[0, 2, 4]);
        assert_eq!(index.positions("b"), &[1]);
        assert!(index.positions("zzz").is_empty());
        assert_eq!(index.distinct_ids(), 3);
    }

    #[test]
    fn test_choose_returns_none_without_match() {
        let index   = MatchIndex::build(&ids(&["a", "b"]));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(index.choose("c", &mut rng), None);
    }

    #[test]
    fn test_choose_stays_within_candidate_set() {
        let index   = MatchIndex::build(&ids(&["a", "b", "a", "c", "a"]));
        let mut rng = StdRng::seed_from_u64(99);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let row = index.choose("a", &mut rng).unwrap();
            assert!([0, 2, 4].contains(&row));
            seen.insert(row);
        }
        // uniform choice eventually hits every match
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_choose_is_reproducible_for_same_seed() {
        let index = MatchIndex::build(&ids(&["x", "x", "x", "y"]));
        let mut r1 = StdRng::seed_from_u64(5);
        let mut r2 = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            assert_eq!(index.choose("x", &mut r1), index.choose("x", &mut r2));
        }
    }
}
