// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Counts token frequencies over the corpus and assigns stable
// integer ids.
//
// Id layout:
//   0  <pad>    padding
//   1  <unk>    anything not in the vocabulary
//   2  init     start-of-sequence token (configurable text)
//   3  eos      end-of-sequence token   (configurable text)
//   4… corpus tokens with count ≥ min_freq,
//      most frequent first, ties broken by first appearance
//
// Once built the vocabulary never changes. Unknown tokens map
// to <unk>; they are never an error.
//
// Reference: Rust Book §8 (Hash Maps)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result};

pub const PAD_IDX: u32 = 0;
pub const UNK_IDX: u32 = 1;
pub const INIT_IDX: u32 = 2;
pub const EOS_IDX: u32 = 3;

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";

/// The four reserved tokens, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub pad:  String,
    pub unk:  String,
    pub init: String,
    pub eos:  String,
}

impl SpecialTokens {
    pub fn new(init: impl Into<String>, eos: impl Into<String>) -> Self {
        Self {
            pad:  PAD_TOKEN.to_string(),
            unk:  UNK_TOKEN.to_string(),
            init: init.into(),
            eos:  eos.into(),
        }
    }

    pub fn as_array(&self) -> [&str; 4] {
        [&self.pad, &self.unk, &self.init, &self.eos]
    }
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self::new("<init>", "<eos>")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    itos:     Vec<String>,
    stoi:     HashMap<String, u32>,
    freqs:    HashMap<String, usize>,
    min_freq: usize,
}

impl Vocabulary {
    /// Count tokens over every sequence and keep those seen at least
    /// `min_freq` times.
    pub fn build<I, S>(sequences: I, specials: &SpecialTokens, min_freq: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[String]>,
    {
        if min_freq == 0 {
            return Err(PipelineError::config("min_freq must be at least 1"));
        }

        // token → (count, first-seen position)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for sequence in sequences {
            for token in sequence.as_ref() {
                let seen = counts.len();
                counts.entry(token.clone()).or_insert((0, seen)).0 += 1;
            }
        }

        let reserved = specials.as_array();
        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .filter(|(token, _)| !reserved.contains(&token.as_str()))
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let mut itos: Vec<String> = reserved.iter().map(|s| s.to_string()).collect();
        let mut freqs = HashMap::new();
        for (token, count, _) in ranked {
            if count >= min_freq {
                itos.push(token.clone());
            }
            freqs.insert(token, count);
        }

        let vocab = Self::from_parts(itos, freqs, min_freq)?;
        tracing::info!(
            "Built vocabulary: {} entries (min_freq={}, {} distinct tokens seen)",
            vocab.len(),
            min_freq,
            vocab.freqs.len()
        );
        Ok(vocab)
    }

    /// Reassemble a vocabulary from its id order and counts.
    /// Fails if a token appears twice in `itos`.
    pub fn from_parts(
        itos:     Vec<String>,
        freqs:    HashMap<String, usize>,
        min_freq: usize,
    ) -> Result<Self> {
        if itos.len() < 4 {
            return Err(PipelineError::config(format!(
                "vocabulary needs the 4 reserved tokens, found {} entries",
                itos.len()
            )));
        }

        let mut stoi = HashMap::with_capacity(itos.len());
        for (idx, token) in itos.iter().enumerate() {
            if stoi.insert(token.clone(), idx as u32).is_some() {
                return Err(PipelineError::config(format!(
                    "token '{token}' appears more than once in the vocabulary"
                )));
            }
        }

        Ok(Self { itos, stoi, freqs, min_freq })
    }

    /// Id for `token`, or the <unk> id.
    pub fn numericalize(&self, token: &str) -> u32 {
        self.stoi.get(token).copied().unwrap_or(UNK_IDX)
    }

    /// Token for `id`, or None when `id` is out of range.
    pub fn denumericalize(&self, id: u32) -> Option<&str> {
        self.itos.get(id as usize).map(|s| s.as_str())
    }

    pub fn numericalize_all(&self, tokens: &[String]) -> Vec<u32> {
        tokens.iter().map(|t| self.numericalize(t)).collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.stoi.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.itos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    pub fn itos(&self) -> &[String] {
        &self.itos
    }

    /// Corpus count of `token` (0 if never seen).
    pub fn freq(&self, token: &str) -> usize {
        self.freqs.get(token).copied().unwrap_or(0)
    }

    pub fn freqs(&self) -> &HashMap<String, usize> {
        &self.freqs
    }

    pub fn min_freq(&self) -> usize {
        self.min_freq
    }

    /// The reserved tokens as stored at ids 0..=3.
    pub fn specials(&self) -> SpecialTokens {
        SpecialTokens {
            pad:  self.itos[PAD_IDX as usize].clone(),
            unk:  self.itos[UNK_IDX as usize].clone(),
            init: self.itos[INIT_IDX as usize].clone(),
            eos:  self.itos[EOS_IDX as usize].clone(),
        }
    }
}
