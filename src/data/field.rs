// ============================================================
// Layer 4 — Text Field (tokenize → frame → pad → numericalize)
// ============================================================
// Everything needed to turn one raw sentence into a fixed-size
// id sequence, given a vocabulary.
//
// Training framing, fix_length = 6:
//
//   "How are you?"
//     → tokens   [how, are, you]
//     → framed   [<init>, how, are, you, <eos>]
//     → padded   [<init>, how, are, you, <eos>, <pad>]   length = 5
//
// A framed sequence longer than fix_length keeps its first
// fix_length ids, so <eos> can be lost. That is accepted and
// only counted (EncodedSequence::truncated).
//
// Inference framing is recorded in the config
// (`frame_inference`) so a separate process applies the same
// choice the training run made.
//
// Reference: Rust Book §8 (Vectors)

use serde::{Deserialize, Serialize};

use crate::data::tokenizer::{Tokenizer, TokenizerConfig};
use crate::data::vocab::{SpecialTokens, Vocabulary, EOS_IDX, INIT_IDX, PAD_IDX};
use crate::domain::error::{PipelineError, Result};

/// Persisted as TEXT.Field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub tokenizer: TokenizerConfig,

    pub specials: SpecialTokens,

    /// Every encoded sequence has exactly this many ids
    pub fix_length: usize,

    /// Wrap inference input in <init> … <eos> like training input
    pub frame_inference: bool,
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fix_length == 0 {
            return Err(PipelineError::config("fix_length must be at least 1"));
        }
        let tokens = self.specials.as_array();
        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() || tokens[..i].contains(token) {
                return Err(PipelineError::config(format!(
                    "reserved tokens must be distinct and non-empty, got {tokens:?}"
                )));
            }
        }
        Ok(())
    }
}

/// One padded id sequence plus its true (pre-padding) length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    pub ids:    Vec<u32>,
    pub length: usize,

    /// The framed sequence was longer than fix_length
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct TextField {
    config:    FieldConfig,
    tokenizer: Tokenizer,
}

impl TextField {
    pub fn new(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::new(config.tokenizer.clone())?;
        Ok(Self { config, tokenizer })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn fix_length(&self) -> usize {
        self.config.fix_length
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    /// Training path: always framed with <init>/<eos>.
    pub fn encode(&self, tokens: &[String], vocab: &Vocabulary) -> EncodedSequence {
        self.pad(&vocab.numericalize_all(tokens), true)
    }

    /// Inference path: framed only when `frame_inference` is set.
    pub fn encode_inference(&self, tokens: &[String], vocab: &Vocabulary) -> EncodedSequence {
        self.pad(&vocab.numericalize_all(tokens), self.config.frame_inference)
    }

    /// Frame (optionally), then truncate or right-pad to fix_length.
    pub fn pad(&self, ids: &[u32], framed: bool) -> EncodedSequence {
        let fix_length = self.config.fix_length;

        let mut out = Vec::with_capacity(ids.len() + 2);
        if framed {
            out.push(INIT_IDX);
        }
        out.extend_from_slice(ids);
        if framed {
            out.push(EOS_IDX);
        }

        let truncated = out.len() > fix_length;
        out.truncate(fix_length);
        let length = out.len();
        out.resize(fix_length, PAD_IDX);

        EncodedSequence { ids: out, length, truncated }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn field(fix_length: usize, frame_inference: bool) -> TextField {
        TextField::new(FieldConfig {
            tokenizer: TokenizerConfig::default(),
            specials:  SpecialTokens::default(),
            fix_length,
            frame_inference,
        })
        .unwrap()
    }

    fn vocab() -> Vocabulary {
        let tokens: Vec<String> = ["how", "are", "you"].iter().map(|s| s.to_string()).collect();
        Vocabulary::build([tokens], &SpecialTokens::default(), 1).unwrap()
    }

    #[test]
    fn test_short_sequence_is_framed_and_padded() {
        let f = field(6, false);
        let v = vocab();
        let enc = f.encode(&f.tokenize("How are you?"), &v);

        assert_eq!(enc.ids, vec![INIT_IDX, 4, 5, 6, EOS_IDX, PAD_IDX]);
        assert_eq!(enc.length, 5);
        assert!(!enc.truncated);
    }

    #[test]
    fn test_long_sequence_is_prefix_truncated() {
        let f = field(3, false);
        let v = vocab();
        let enc = f.encode(&f.tokenize("how are you"), &v);

        assert_eq!(enc.ids, vec![INIT_IDX, 4, 5]);
        assert_eq!(enc.length, 3);
        assert!(enc.truncated);
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let f = field(5, false);
        let enc = f.encode(&f.tokenize("how are you"), &vocab());
        assert_eq!(enc.length, 5);
        assert!(!enc.truncated);
        assert_eq!(enc.ids.last(), Some(&EOS_IDX));
    }

    #[test]
    fn test_padding_invariant_holds_for_all_lengths() {
        for fix_length in 1..8 {
            let f = field(fix_length, false);
            for n in 0..8 {
                let ids = vec![4u32; n];
                let enc = f.pad(&ids, true);
                assert_eq!(enc.ids.len(), fix_length);
                assert!(enc.ids[enc.length..].iter().all(|&id| id == PAD_IDX));
                let framed: Vec<u32> = std::iter::once(INIT_IDX)
                    .chain(ids.iter().copied())
                    .chain(std::iter::once(EOS_IDX))
                    .collect();
                let keep = framed.len().min(fix_length);
                assert_eq!(&enc.ids[..keep], &framed[..keep]);
            }
        }
    }

    #[test]
    fn test_inference_framing_follows_config() {
        let v = vocab();
        let bare = field(4, false).encode_inference(&["how".to_string()], &v);
        assert_eq!(bare.ids, vec![4, PAD_IDX, PAD_IDX, PAD_IDX]);

        let framed = field(4, true).encode_inference(&["how".to_string()], &v);
        assert_eq!(framed.ids, vec![INIT_IDX, 4, EOS_IDX, PAD_IDX]);
    }

    #[test]
    fn test_config_validation() {
        let mut config = field(4, false).config().clone();
        config.fix_length = 0;
        assert!(TextField::new(config.clone()).is_err());

        config.fix_length = 4;
        config.specials.eos = config.specials.init.clone();
        assert!(TextField::new(config).is_err());
    }
}
