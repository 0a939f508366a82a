// ============================================================
// Layer 4 — Chat Dataset
// ============================================================
// Holds every numericalized (talk, response) example of one
// split and exposes it through burn's Dataset trait:
//
//   TokenizedPair ──field.encode──► ChatExample
//                                    ├ talk:     ids + true length
//                                    └ response: ids + true length
//
// Truncations are counted once, at encode time.
//
// Reference: burn::data::dataset documentation

use burn::data::dataset::Dataset;

use crate::data::field::{EncodedSequence, TextField};
use crate::data::vocab::Vocabulary;

/// One fully numericalized (talk, response) example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExample {
    pub pair_id:  usize,
    pub talk:     EncodedSequence,
    pub response: EncodedSequence,
}

impl ChatExample {
    /// Bucketing key: true lengths of both sides.
    pub fn sort_key(&self) -> (usize, usize) {
        (self.talk.length, self.response.length)
    }

    pub fn padding(&self) -> usize {
        (self.talk.ids.len() - self.talk.length) + (self.response.ids.len() - self.response.length)
    }
}

/// A pair after tokenization, before numericalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedPair {
    pub pair_id:  usize,
    pub talk:     Vec<String>,
    pub response: Vec<String>,
}

pub struct ChatDataset {
    examples:  Vec<ChatExample>,
    truncated: usize,
}

impl ChatDataset {
    /// Frame, pad and numericalize every tokenized pair.
    pub fn encode(pairs: &[TokenizedPair], field: &TextField, vocab: &Vocabulary) -> Self {
        let mut truncated = 0usize;
        let examples = pairs
            .iter()
            .map(|pair| {
                let talk     = field.encode(&pair.talk, vocab);
                let response = field.encode(&pair.response, vocab);
                let overflow = talk.truncated as usize + response.truncated as usize;
                if overflow > 0 {
                    tracing::debug!("Pair {} truncated to {} ids", pair.pair_id, field.fix_length());
                }
                truncated += overflow;
                ChatExample { pair_id: pair.pair_id, talk, response }
            })
            .collect();

        Self::new(examples, truncated)
    }

    pub fn new(examples: Vec<ChatExample>, truncated: usize) -> Self {
        Self { examples, truncated }
    }

    pub fn sample_count(&self) -> usize { self.examples.len() }

    /// Number of sequences (talk or response) longer than fix_length.
    pub fn truncated_count(&self) -> usize { self.truncated }

    pub fn examples(&self) -> &[ChatExample] { &self.examples }

    pub fn into_examples(self) -> Vec<ChatExample> { self.examples }
}

impl Dataset<ChatExample> for ChatDataset {
    fn get(&self, index: usize) -> Option<ChatExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
