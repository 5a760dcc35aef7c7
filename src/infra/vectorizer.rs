// ============================================================
// Layer 6 — Vocabulary Vectorizer
// ============================================================
// Turns description text into fixed-length token id vectors.
//
// The vocabulary file lists one word per line. A word-level
// HuggingFace tokenizer is assembled from it as tokenizer
// JSON and loaded with Tokenizer::from_str:
//
//   id 0  [PAD]   padding, never produced by encoding
//   id 1  [UNK]   any word missing from the vocabulary
//   id 2… words   in vocabulary file order
//
// Text is lowercased by the BertNormalizer and split on
// whitespace and punctuation, then every vector is truncated
// or zero padded to `length`.
//
// Reference: tokenizers crate documentation (WordLevel model)

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tokenizers::Tokenizer;

use crate::domain::records::PAD_TOKEN;
use crate::domain::traits::Vectorizer;

/// Id assigned to out-of-vocabulary words
pub const UNK_TOKEN: u32 = 1;

/// Ids below this are reserved for special tokens
const RESERVED: u32 = 2;

pub struct VocabularyVectorizer {
    tokenizer:  Tokenizer,
    vocab_size: usize,
    length:     usize,
}

impl VocabularyVectorizer {
    /// Load a one-word-per-line vocabulary file.
    pub fn from_file(path: impl AsRef<Path>, length: usize) -> Result<Self> {
        let path = path.as_ref();
        let raw  = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot load vocabulary '{}'", path.display()))?;
        let words: Vec<&str> = raw.lines().collect();
        let vectorizer = Self::from_words(&words, length)?;

        tracing::info!(
            "Vocabulary loaded from '{}' ({} ids, vectors of {} tokens)",
            path.display(),
            vectorizer.vocab_size,
            length
        );
        Ok(vectorizer)
    }

    /// Build from an in-memory word list. Blank lines and
    /// repeated words are skipped.
    pub fn from_words<S: AsRef<str>>(words: &[S], length: usize) -> Result<Self> {
        let mut vocab = serde_json::json!({
            "[PAD]": PAD_TOKEN,
            "[UNK]": UNK_TOKEN,
        });

        let mut next_id = RESERVED;
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() || vocab.get(&word).is_some() {
                continue;
            }
            vocab[word.as_str()] = serde_json::json!(next_id);
            next_id += 1;
        }

        // HuggingFace tokenizer JSON, as Tokenizer::from_str expects it
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_TOKEN, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": UNK_TOKEN, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tokenizer = Tokenizer::from_str(&tokenizer_json.to_string())
            .map_err(|e| anyhow::anyhow!("Cannot build vocabulary tokenizer: {e}"))?;

        Ok(Self {
            tokenizer,
            vocab_size: next_id as usize,
            length,
        })
    }

}

impl Vectorizer for VocabularyVectorizer {
    fn description_to_vector(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Cannot tokenize description '{text}': {e}"))?;
        let mut ids = encoding.get_ids().to_vec();
        ids.resize(self.length, PAD_TOKEN);
        Ok(ids)
    }

    fn vocabulary_size(&self) -> usize {
        self.vocab_size
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(length: usize) -> VocabularyVectorizer {
        VocabularyVectorizer::from_words(&["red", "cube", "blue", "sphere", "", "Red"], length)
            .unwrap()
    }

    #[test]
    fn test_vocabulary_size_counts_reserved_ids() {
        // [PAD], [UNK], red, cube, blue, sphere
        assert_eq!(vectorizer(4).vocabulary_size(), 6);
    }

    #[test]
    fn test_known_words_are_padded() {
        let v = vectorizer(5);
        assert_eq!(v.description_to_vector("red cube").unwrap(), vec![2, 3, 0, 0, 0]);
        assert_eq!(v.description_to_vector("Blue SPHERE.").unwrap(), vec![4, 5, UNK_TOKEN, 0, 0]);
    }

    #[test]
    fn test_unknown_words_and_truncation() {
        let v = vectorizer(3);
        assert_eq!(v.description_to_vector("a red cube on a sphere").unwrap(), vec![UNK_TOKEN, 2, 3]);
        assert_eq!(v.description_to_vector("").unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_from_file_missing_vocabulary() {
        let err = VocabularyVectorizer::from_file("/no/such/vocabulary.txt", 8)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Cannot load vocabulary"));
    }

    #[test]
    fn test_from_file_reads_lines() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("voc.txt");
        std::fs::write(&path, "chair\ntable\n").unwrap();

        let v = VocabularyVectorizer::from_file(&path, 4).unwrap();
        assert_eq!(v.vocabulary_size(), 4);
        assert_eq!(v.description_to_vector("table chair").unwrap(), vec![3, 2, 0, 0]);
    }
}
