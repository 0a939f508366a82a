// ============================================================
// Layer 4 — Text Normalizer / Tokenizer
// ============================================================
// Pure function from raw utterance text to word tokens.
//
// Steps (applied in order):
//   1. Unicode NFC normalisation
//   2. Trim leading/trailing whitespace
//   3. Split on whitespace
//   4. Strip every non-word character from each unit
//      (word = alphanumeric, mark, connector punctuation like '_')
//   5. Drop units that became empty
//   6. Lowercase
//   7. Drop tokens whose length reaches `max_token_len`
//
// Example:
//   "  Hello,   THERE! don't  ...  "
//   → ["hello", "there", "dont"]
//
// The tokenizer carries only its configuration. That config is
// what gets persisted, so an inference process rebuilds the
// exact same function from the Field artifact.
//
// Reference: unicode-normalization crate documentation
//            regex crate documentation (Unicode \w class)

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::domain::error::{PipelineError, Result};

/// Characters outside the Unicode word class.
pub const NON_WORD_PATTERN: &str = r"[^\w]";

/// Every option the tokenizer recognises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Lowercase surviving tokens
    pub lowercase: bool,

    /// Tokens with this many characters or more are dropped.
    /// `None` keeps every token.
    pub max_token_len: Option<usize>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase:     true,
            max_token_len: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    config:   TokenizerConfig,
    non_word: Regex,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        if config.max_token_len == Some(0) {
            return Err(PipelineError::config("max_token_len must be at least 1"));
        }
        let non_word = Regex::new(NON_WORD_PATTERN)
            .map_err(|e| PipelineError::config(format!("non-word pattern: {e}")))?;
        Ok(Self { config, non_word })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Split raw text into normalised tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let composed: String = text.nfc().collect();

        composed
            .trim()
            .split_whitespace()
            .map(|unit| self.non_word.replace_all(unit, ""))
            .filter(|unit| !unit.is_empty())
            .map(|unit| {
                if self.config.lowercase {
                    unit.to_lowercase()
                } else {
                    unit.into_owned()
                }
            })
            .filter(|token| match self.config.max_token_len {
                Some(max) => token.chars().count() < max,
                None => true,
            })
            .collect()
    }
}

/// Rejoin tokens with single spaces.
pub fn detokenize(tokens: &[String]) -> String {
    tokens.join(" ")
}
