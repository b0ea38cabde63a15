//! Tokenization
//!
//! Maps normalized text to the fixed-length index sequences the models were
//! trained on. The vocabulary artifact carries its own tokenization rules
//! (case folding, filter set, split character, truncation side) so the
//! transform here stays bit-identical to the one used at fit time even when
//! those rules change between model generations.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::artifact;
use crate::constants::{DEFAULT_TOKEN_FILTERS, DEFAULT_TOKEN_SPLIT, TOKENIZER_FILE};
use crate::error::{PipelineError, PipelineResult};

/// Index reserved for padding positions
pub const PAD_ID: u32 = 0;

/// Which end of an over-long sequence is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncating {
    /// Drop leading tokens, keep the tail
    Pre,
    /// Drop trailing tokens, keep the head
    Post,
}

impl Default for Truncating {
    fn default() -> Self {
        Truncating::Pre
    }
}

/// Vocabulary plus the rules that produced it
#[derive(Debug, Clone, Deserialize)]
pub struct Tokenizer {
    word_index: HashMap<String, u32>,
    #[serde(default = "default_lower")]
    lower: bool,
    #[serde(default)]
    char_level: bool,
    #[serde(default = "default_filters")]
    filters: String,
    #[serde(default = "default_split")]
    split: char,
    #[serde(default)]
    oov_index: u32,
    #[serde(default)]
    truncating: Truncating,
}

fn default_lower() -> bool {
    true
}

fn default_filters() -> String {
    DEFAULT_TOKEN_FILTERS.to_string()
}

fn default_split() -> char {
    DEFAULT_TOKEN_SPLIT
}

impl Tokenizer {
    /// Load and validate the tokenizer artifact from a pipeline directory
    pub fn load(dir: &Path) -> PipelineResult<Self> {
        let tokenizer: Tokenizer = artifact::load_json(dir, TOKENIZER_FILE)?;
        if tokenizer.word_index.is_empty() {
            return Err(PipelineError::invalid_artifact(
                dir.join(TOKENIZER_FILE),
                "empty vocabulary",
            ));
        }
        Ok(tokenizer)
    }

    /// Encode text into exactly `max_len` vocabulary indices.
    ///
    /// Unknown tokens map to the artifact's OOV index (0 unless the
    /// vocabulary was fitted with a dedicated OOV entry). Short sequences
    /// are right-padded with [`PAD_ID`]; long ones are truncated from the
    /// configured side.
    pub fn encode(&self, text: &str, max_len: usize) -> TokenSequence {
        TokenSequence::fit(self.ids(text), max_len, self.truncating)
    }

    fn ids(&self, text: &str) -> Vec<u32> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.char_level {
            let mut buf = [0u8; 4];
            return text
                .chars()
                .map(|c| self.lookup(c.encode_utf8(&mut buf)))
                .collect();
        }

        // Filter characters become split points, then empty tokens drop out,
        // so runs of punctuation never produce tokens of their own.
        let translated: String = text
            .chars()
            .map(|c| if self.filters.contains(c) { self.split } else { c })
            .collect();
        translated
            .split(self.split)
            .filter(|token| !token.is_empty())
            .map(|token| self.lookup(token))
            .collect()
    }

    fn lookup(&self, token: &str) -> u32 {
        self.word_index
            .get(token)
            .copied()
            .unwrap_or(self.oov_index)
    }
}

/// Fixed-length index sequence ready for the model.
///
/// The constructor guarantees `len() == max_len`, so downstream tensor
/// shapes never depend on the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence(Vec<u32>);

impl TokenSequence {
    fn fit(mut ids: Vec<u32>, max_len: usize, truncating: Truncating) -> Self {
        if ids.len() > max_len {
            match truncating {
                Truncating::Post => ids.truncate(max_len),
                Truncating::Pre => {
                    let excess = ids.len() - max_len;
                    ids.drain(..excess);
                }
            }
        } else {
            ids.resize(max_len, PAD_ID);
        }
        TokenSequence(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_tokenizer() -> Tokenizer {
        let json = r#"{
            "word_index": {"verify": 1, "your": 2, "account": 3, "now": 4},
            "truncating": "pre"
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rule_defaults() {
        let tokenizer = word_tokenizer();
        assert!(tokenizer.lower);
        assert!(!tokenizer.char_level);
        assert_eq!(tokenizer.split, ' ');
        assert_eq!(tokenizer.oov_index, 0);
        assert_eq!(tokenizer.truncating, Truncating::Pre);
    }

    #[test]
    fn test_punctuation_and_case() {
        let tokenizer = word_tokenizer();
        let seq = tokenizer.encode("Verify,your...ACCOUNT now!!!", 6);
        assert_eq!(seq.as_slice(), &[1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_oov_mapping() {
        let tokenizer = word_tokenizer();
        let seq = tokenizer.encode("verify unknownword account", 4);
        assert_eq!(seq.as_slice(), &[1, 0, 3, 0]);
    }

    #[test]
    fn test_right_padding() {
        let tokenizer = word_tokenizer();
        let seq = tokenizer.encode("now", 5);
        assert_eq!(seq.as_slice(), &[4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_pre_truncation() {
        let tokenizer = word_tokenizer();
        let seq = tokenizer.encode("verify your account now", 2);
        assert_eq!(seq.as_slice(), &[3, 4]);
    }

    #[test]
    fn test_post_truncation() {
        let json = r#"{
            "word_index": {"verify": 1, "your": 2, "account": 3, "now": 4},
            "truncating": "post"
        }"#;
        let tokenizer: Tokenizer = serde_json::from_str(json).unwrap();
        let seq = tokenizer.encode("verify your account now", 2);
        assert_eq!(seq.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_char_level() {
        let json = r#"{
            "word_index": {"a": 1, "b": 2, "c": 3, "/": 4, ".": 5},
            "char_level": true
        }"#;
        let tokenizer: Tokenizer = serde_json::from_str(json).unwrap();
        let seq = tokenizer.encode("ab.c/x", 8);
        assert_eq!(seq.as_slice(), &[1, 2, 5, 3, 4, 0, 0, 0]);
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = word_tokenizer();
        let seq = tokenizer.encode("", 4);
        assert_eq!(seq.as_slice(), &[0, 0, 0, 0]);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_fixed_length() {
        let tokenizer = word_tokenizer();
        for text in ["", "now", "verify your account now verify your account now"] {
            assert_eq!(tokenizer.encode(text, 7).len(), 7);
        }
    }
}
